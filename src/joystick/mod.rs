//! # Joystick Module
//!
//! Gamepad input handling.
//!
//! This module handles:
//! - Gamepad detection and connection via evdev
//! - Accumulating raw input events into named button/axis state
//! - Normalizing axes to [-1, 1] with a configurable deadzone
//! - Producing [`mapper::JoySnapshot`] values for the teleop controller

pub mod gamepad;
pub mod mapper;

pub use gamepad::Gamepad;
pub use mapper::{JoyMapper, JoySnapshot};
