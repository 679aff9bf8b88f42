//! # Joy Teleop
//!
//! Drive a mobile robot with a gamepad.
//!
//! This application turns gamepad input into velocity commands: fully
//! proportional two-stick teleoperation, plus an auto-teleop (cruise) mode
//! that holds a trimmed forward speed while one axis steers.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber;

use joy_teleop::config::Config;
use joy_teleop::emitter::CommandEmitter;
use joy_teleop::joystick::{Gamepad, JoyMapper};
use joy_teleop::telemetry::CommandLog;
use joy_teleop::teleop::TeleopController;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the Joy Teleop application
///
/// Initializes the application and runs the main loop that turns gamepad
/// snapshots into velocity commands at the configured rate.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first CLI argument or `config/default.toml`)
///    - Detect and open the gamepad, read its axis ranges
///    - Open the serial command link and the optional telemetry log
///
/// 2. **Main Loop**
///    - Fold incoming gamepad events into the input mapper
///    - On every snapshot tick, run the teleop controller and emit the
///      commands it produced
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop snapshot processing
///    - Log total command count
///    - Clean exit
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be loaded
/// - No gamepad is found
/// - The serial command link cannot be opened
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Joy Teleop v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    info!("Loaded configuration from {}", config_path);

    // Open the gamepad and read its static properties before converting it
    // into an event stream
    let gamepad = Gamepad::open(&config.gamepad.device_path)?;
    info!(
        "Gamepad connected at {} ({})",
        gamepad.device_path(),
        gamepad.name().unwrap_or("unnamed")
    );

    let mut mapper = JoyMapper::new(gamepad.axis_ranges(), config.gamepad.deadzone);
    let mut events = gamepad.into_event_stream()?;

    let mut teleop = TeleopController::new(config.teleop.clone());
    let mut emitter = CommandEmitter::open(&config.output)?;

    let mut telemetry = if config.telemetry.enabled {
        Some(CommandLog::new(&config.telemetry)?)
    } else {
        None
    };

    // Snapshot interval from the configured rate
    let period_ms = 1000 / config.gamepad.snapshot_rate_hz as u64;
    let mut snapshot_interval = interval(Duration::from_millis(period_ms));

    info!(
        "Processing snapshots at {}Hz",
        config.gamepad.snapshot_rate_hz
    );
    info!("Press Ctrl+C to exit");

    let mut command_count: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            // Fold gamepad events into the mapper as they arrive
            event = events.next_event() => {
                match event {
                    Ok(event) => mapper.process_event(&event),
                    Err(e) => warn!("Gamepad read failed: {}", e),
                }
            }

            // Process one snapshot at the configured rate
            _ = snapshot_interval.tick() => {
                let snapshot = mapper.snapshot();

                for command in teleop.process(&snapshot) {
                    if let Err(e) = emitter.send(&command).await {
                        debug!("Failed to send command: {}", e);
                        continue;
                    }
                    command_count += 1;

                    if let Some(log) = telemetry.as_mut() {
                        if let Err(e) = log.record(&command) {
                            warn!("Telemetry write failed: {}", e);
                        }
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total commands sent: {}", command_count);
                break;
            }
        }
    }

    Ok(())
}
