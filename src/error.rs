//! # Error Types
//!
//! Custom error types for Joy Teleop using `thiserror`.

use thiserror::Error;

/// Main error type for Joy Teleop
#[derive(Debug, Error)]
pub enum JoyTeleopError {
    /// Gamepad detection or input errors
    #[error("joystick error: {0}")]
    Joystick(String),

    /// No usable gamepad found on the system
    #[error("no gamepad found under /dev/input")]
    JoystickNotFound,

    /// Serial link errors
    #[error("serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Command encoding errors
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Joy Teleop
pub type Result<T> = std::result::Result<T, JoyTeleopError>;
