//! # Telemetry Module
//!
//! Handles command logging to JSONL files with rotation.
//!
//! This module handles:
//! - Recording every emitted velocity command
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod logger;

pub use logger::CommandLog;
