//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub teleop: TeleopConfig,
    pub gamepad: GamepadConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

/// Teleop controller configuration
///
/// Base and maximum speed magnitudes, trim increments and scales, and the
/// command framing options. There is deliberately no check that the maximum
/// speeds exceed the base speeds: an inconsistent pair degrades into trim
/// locks that stay engaged in one direction, it is not a load error.
#[derive(Debug, Deserialize, Clone)]
pub struct TeleopConfig {
    /// Base linear speed in m/s
    #[serde(default = "default_linear_x")]
    pub linear_x: f64,

    /// Maximum linear speed magnitude in m/s
    #[serde(default = "default_linear_x_max")]
    pub linear_x_max: f64,

    /// Base angular speed in rad/s
    #[serde(default = "default_angular_z")]
    pub angular_z: f64,

    /// Maximum angular speed magnitude in rad/s
    #[serde(default = "default_angular_z_max")]
    pub angular_z_max: f64,

    /// Linear trim increment per bumper press, m/s
    #[serde(default = "default_speed_up_down_linear_x")]
    pub speed_up_down_linear_x: f64,

    /// Angular trim increment per bumper press, rad/s
    #[serde(default = "default_speed_up_down_angular_z")]
    pub speed_up_down_angular_z: f64,

    /// Multiplier applied to the accumulated linear trim
    #[serde(default = "default_speed_up_down_scale_linear_x")]
    pub speed_up_down_scale_linear_x: f64,

    /// Multiplier applied to the accumulated angular trim
    #[serde(default = "default_speed_up_down_scale_angular_z")]
    pub speed_up_down_scale_angular_z: f64,

    /// Emit stamped commands (frame id + timestamp) instead of bare twists
    #[serde(default = "default_publish_twist_stamped")]
    pub publish_twist_stamped: bool,

    /// Frame id attached to stamped driving commands
    #[serde(default = "default_frame_id")]
    pub frame_id: String,
}

/// Gamepad input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GamepadConfig {
    /// Explicit evdev device path; empty means auto-detect
    #[serde(default)]
    pub device_path: String,

    /// Symmetric stick deadzone as a fraction of full deflection
    #[serde(default = "default_deadzone")]
    pub deadzone: f64,

    /// Snapshot processing rate in Hz
    #[serde(default = "default_snapshot_rate_hz")]
    pub snapshot_rate_hz: u32,
}

/// Serial output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_linear_x() -> f64 { 0.5 }
fn default_linear_x_max() -> f64 { 1.0 }
fn default_angular_z() -> f64 { 0.5 }
fn default_angular_z_max() -> f64 { 1.0 }
fn default_speed_up_down_linear_x() -> f64 { 0.1 }
fn default_speed_up_down_angular_z() -> f64 { 0.1 }
fn default_speed_up_down_scale_linear_x() -> f64 { 1.0 }
fn default_speed_up_down_scale_angular_z() -> f64 { 1.0 }
fn default_publish_twist_stamped() -> bool { true }
fn default_frame_id() -> String { "teleop_twist_joy_comfy".to_string() }

fn default_deadzone() -> f64 { 0.05 }
fn default_snapshot_rate_hz() -> u32 { 50 }

fn default_output_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 115_200 }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joy_teleop::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Only plumbing values are checked here; the teleop section is taken
    /// as-is (see [`TeleopConfig`]).
    fn validate(&self) -> Result<()> {
        if self.gamepad.deadzone < 0.0 || self.gamepad.deadzone > 0.25 {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("deadzone must be between 0.0 and 0.25")
            ));
        }

        if self.gamepad.snapshot_rate_hz == 0 || self.gamepad.snapshot_rate_hz > 500 {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("snapshot_rate_hz must be between 1 and 500")
            ));
        }

        if self.output.port.is_empty() {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("output port cannot be empty")
            ));
        }

        if self.output.baud_rate == 0 {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("baud_rate must be greater than 0")
            ));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("telemetry log_dir cannot be empty when enabled")
            ));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(crate::error::JoyTeleopError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    /// Built-in defaults, identical to loading an empty TOML document.
    fn default() -> Self {
        Self {
            teleop: TeleopConfig::default(),
            gamepad: GamepadConfig::default(),
            output: OutputConfig {
                port: default_output_port(),
                baud_rate: default_baud_rate(),
            },
            telemetry: TelemetryConfig {
                enabled: default_telemetry_enabled(),
                log_dir: default_log_dir(),
                max_records_per_file: default_max_records_per_file(),
                max_files_to_keep: default_max_files_to_keep(),
            },
        }
    }
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            linear_x: default_linear_x(),
            linear_x_max: default_linear_x_max(),
            angular_z: default_angular_z(),
            angular_z_max: default_angular_z_max(),
            speed_up_down_linear_x: default_speed_up_down_linear_x(),
            speed_up_down_angular_z: default_speed_up_down_angular_z(),
            speed_up_down_scale_linear_x: default_speed_up_down_scale_linear_x(),
            speed_up_down_scale_angular_z: default_speed_up_down_scale_angular_z(),
            publish_twist_stamped: default_publish_twist_stamped(),
            frame_id: default_frame_id(),
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            deadzone: default_deadzone(),
            snapshot_rate_hz: default_snapshot_rate_hz(),
        }
    }
}
