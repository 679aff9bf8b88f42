//! # Emitter Module
//!
//! Velocity command emission over the serial link to the base controller.
//!
//! This module handles:
//! - Opening the configured serial port (8N1)
//! - Encoding each command as one JSON line
//! - Write-and-flush per command so the base sees them immediately

pub mod sink;

use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::{JoyTeleopError, Result};
use crate::teleop::VelocityCommand;
use self::sink::{SinkIO, TokioSerialSink};

/// Command emitter
///
/// Owns the serial link to the robot base and writes each velocity command
/// as one newline-terminated JSON document.
pub struct CommandEmitter {
    sink: Box<dyn SinkIO>,
    device_path: String,
}

impl std::fmt::Debug for CommandEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEmitter")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl CommandEmitter {
    /// Open the configured serial port
    ///
    /// # Errors
    ///
    /// Returns `Serial` error if the port cannot be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joy_teleop::config::OutputConfig;
    /// use joy_teleop::emitter::CommandEmitter;
    ///
    /// let config = OutputConfig { port: "/dev/ttyACM0".to_string(), baud_rate: 115_200 };
    /// let emitter = CommandEmitter::open(&config)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &OutputConfig) -> Result<Self> {
        let port = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                JoyTeleopError::Serial(format!("Failed to open {}: {}", config.port, e))
            })?;

        info!("Opened command link at {}", config.port);

        Ok(Self {
            sink: Box::new(TokioSerialSink::new(port)),
            device_path: config.port.clone(),
        })
    }

    /// Build an emitter over an arbitrary sink (used by tests)
    pub fn with_sink(sink: Box<dyn SinkIO>, device_path: String) -> Self {
        Self { sink, device_path }
    }

    /// Send one velocity command
    ///
    /// Encodes the command as a JSON line and writes it through the sink.
    pub async fn send(&mut self, command: &VelocityCommand) -> Result<()> {
        let mut line = serde_json::to_vec(command)?;
        line.push(b'\n');

        self.sink
            .write_all(&line)
            .await
            .map_err(|e| JoyTeleopError::Serial(format!("Failed to write command: {}", e)))?;

        self.sink
            .flush()
            .await
            .map_err(|e| JoyTeleopError::Serial(format!("Failed to flush command link: {}", e)))?;

        debug!("Sent command ({} bytes)", line.len());
        Ok(())
    }

    /// Get the device path of the opened link
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teleop::Twist;
    use super::sink::MockSinkIO;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn plain_command() -> VelocityCommand {
        VelocityCommand::plain(Twist::new(0.5, -0.25))
    }

    #[tokio::test]
    async fn test_send_writes_one_json_line() {
        let written: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

        let mut mock = MockSinkIO::new();
        let sink_data = Arc::clone(&written);
        mock.expect_write_all()
            .times(1)
            .returning(move |data| {
                sink_data.lock().unwrap().extend_from_slice(data);
                Ok(())
            });
        mock.expect_flush().times(1).returning(|| Ok(()));

        let mut emitter = CommandEmitter::with_sink(Box::new(mock), "/dev/test".to_string());
        emitter.send(&plain_command()).await.unwrap();

        let written = written.lock().unwrap();
        assert_eq!(*written.last().unwrap(), b'\n');

        let value: serde_json::Value = serde_json::from_slice(&written[..written.len() - 1]).unwrap();
        assert_eq!(value["linear_x"], 0.5);
        assert_eq!(value["angular_z"], -0.25);
    }

    #[tokio::test]
    async fn test_stamped_command_line_includes_header() {
        let written: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

        let mut mock = MockSinkIO::new();
        let sink_data = Arc::clone(&written);
        mock.expect_write_all().returning(move |data| {
            sink_data.lock().unwrap().extend_from_slice(data);
            Ok(())
        });
        mock.expect_flush().returning(|| Ok(()));

        let mut emitter = CommandEmitter::with_sink(Box::new(mock), "/dev/test".to_string());
        emitter
            .send(&VelocityCommand::stamped(
                "teleop_twist_joy_comfy".to_string(),
                Twist::new(0.1, 0.0),
            ))
            .await
            .unwrap();

        let written = written.lock().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&written[..written.len() - 1]).unwrap();
        assert_eq!(value["header"]["frame_id"], "teleop_twist_joy_comfy");
        assert_eq!(value["twist"]["linear_x"], 0.1);
    }

    #[test]
    fn test_write_error_maps_to_serial() {
        let mut mock = MockSinkIO::new();
        mock.expect_write_all()
            .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")));

        let mut emitter = CommandEmitter::with_sink(Box::new(mock), "/dev/test".to_string());
        let result = tokio_test::block_on(emitter.send(&plain_command()));

        match result.unwrap_err() {
            JoyTeleopError::Serial(msg) => assert!(msg.contains("Failed to write command")),
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    #[test]
    fn test_flush_error_maps_to_serial() {
        let mut mock = MockSinkIO::new();
        mock.expect_write_all().returning(|_| Ok(()));
        mock.expect_flush()
            .returning(|| Err(io::Error::new(io::ErrorKind::TimedOut, "timeout")));

        let mut emitter = CommandEmitter::with_sink(Box::new(mock), "/dev/test".to_string());
        let result = tokio_test::block_on(emitter.send(&plain_command()));

        match result.unwrap_err() {
            JoyTeleopError::Serial(msg) => assert!(msg.contains("Failed to flush")),
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_with_missing_port_returns_error() {
        let config = OutputConfig {
            port: "/dev/nonexistent_serial_device_12345".to_string(),
            baud_rate: 115_200,
        };

        let result = CommandEmitter::open(&config);
        assert!(result.is_err());

        match result.unwrap_err() {
            JoyTeleopError::Serial(msg) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    // Integration test - only runs if a base controller is connected
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_send_with_real_hardware() {
        let config = OutputConfig {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 115_200,
        };

        if let Ok(mut emitter) = CommandEmitter::open(&config) {
            let send_result = emitter.send(&plain_command()).await;
            assert!(send_result.is_ok(), "Failed to send: {:?}", send_result);
        } else {
            println!("No base controller detected (this is OK for CI)");
        }
    }
}
