//! # Gamepad Device Module
//!
//! This module handles gamepad detection, connection, and event streaming
//! using the Linux evdev interface.
//!
//! ## Detection
//!
//! Any device under `/dev/input/event*` that advertises gamepad buttons
//! (BTN_SOUTH) together with an absolute X axis is accepted, so standard
//! Xbox-layout pads, DualShock/DualSense controllers and most generic USB
//! gamepads all work. An explicit device path in the configuration skips
//! detection entirely.

use evdev::{AbsoluteAxisType, Device, Key};
use std::path::Path;
use tracing::{debug, info};

use super::mapper::{AxisRange, AxisRanges};
use crate::error::{JoyTeleopError, Result};

/// Connected gamepad handle
///
/// Wraps an evdev device known to expose gamepad buttons and sticks.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Gamepad {
    /// Open a gamepad
    ///
    /// Opens the given device path, or scans for one when the path is empty.
    ///
    /// # Errors
    ///
    /// - `Joystick`: the explicit path cannot be opened or is not a gamepad
    /// - `JoystickNotFound`: detection found no usable device
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joy_teleop::joystick::Gamepad;
    ///
    /// let gamepad = Gamepad::open("")?;
    /// println!("Connected to gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device_path: &str) -> Result<Self> {
        if device_path.is_empty() {
            Self::detect()
        } else {
            let device = Device::open(device_path).map_err(|e| {
                JoyTeleopError::Joystick(format!("Failed to open {}: {}", device_path, e))
            })?;

            if !Self::is_gamepad(&device) {
                return Err(JoyTeleopError::Joystick(format!(
                    "{} does not look like a gamepad",
                    device_path
                )));
            }

            Ok(Self {
                device,
                device_path: device_path.to_string(),
            })
        }
    }

    /// Scan `/dev/input` for the first device that looks like a gamepad.
    fn detect() -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(JoyTeleopError::Joystick(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| JoyTeleopError::Joystick(format!("Failed to read /dev/input: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                JoyTeleopError::Joystick(format!("Failed to read directory entry: {}", e))
            })?;

        // Sort entries for deterministic device selection when multiple
        // gamepads are connected
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            // Only check event* devices
            if let Some(filename) = path.file_name() {
                if !filename.to_string_lossy().starts_with("event") {
                    continue;
                }
            } else {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if Self::is_gamepad(&device) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found gamepad at: {}", device_path);

                        return Ok(Gamepad {
                            device,
                            device_path,
                        });
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(JoyTeleopError::JoystickNotFound)
    }

    /// True when the device exposes gamepad buttons and an X axis.
    fn is_gamepad(device: &Device) -> bool {
        let has_buttons = device
            .supported_keys()
            .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
        let has_stick = device
            .supported_absolute_axes()
            .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_X));

        has_buttons && has_stick
    }

    /// Raw value ranges the device reports for the mapped axes.
    ///
    /// Falls back to the 8-bit default range if the kernel query fails or a
    /// reported range is degenerate.
    #[must_use]
    pub fn axis_ranges(&self) -> AxisRanges {
        let Ok(state) = self.device.get_abs_state() else {
            return AxisRanges::default();
        };

        let range = |axis: AbsoluteAxisType| {
            let info = state[axis.0 as usize];
            AxisRange::new(info.minimum, info.maximum)
        };

        AxisRanges {
            x: range(AbsoluteAxisType::ABS_X),
            y: range(AbsoluteAxisType::ABS_Y),
            rx: range(AbsoluteAxisType::ABS_RX),
        }
    }

    /// Get the device path of this gamepad
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Get the gamepad name from evdev
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Convert into an async event stream
    ///
    /// Consumes the handle; read the axis ranges first.
    pub fn into_event_stream(self) -> Result<evdev::EventStream> {
        self.device
            .into_event_stream()
            .map_err(|e| JoyTeleopError::Joystick(format!("Failed to start event stream: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_with_missing_path_returns_error() {
        let result = Gamepad::open("/dev/input/event_does_not_exist_12345");

        assert!(result.is_err());
        match result.unwrap_err() {
            JoyTeleopError::Joystick(msg) => {
                assert!(msg.contains("/dev/input/event_does_not_exist_12345"));
            }
            other => panic!("Expected Joystick error, got: {:?}", other),
        }
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_detect_with_real_hardware() {
        // This test requires a connected gamepad
        let result = Gamepad::open("");
        assert!(result.is_ok(), "Should detect a connected gamepad");

        let gamepad = result.unwrap();
        assert!(gamepad.device_path().starts_with("/dev/input/event"));

        let ranges = gamepad.axis_ranges();
        assert!(ranges.x.max > ranges.x.min);
    }
}
