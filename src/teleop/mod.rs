//! # Teleop Module
//!
//! The input-to-command core.
//!
//! This module handles:
//! - Velocity command types (plain and stamped)
//! - The snapshot-processing state machine: mode switching, per-axis
//!   velocity shaping with clamping, and incremental speed trim with
//!   saturation locks

pub mod command;
pub mod controller;

pub use command::{Twist, VelocityCommand};
pub use controller::TeleopController;
