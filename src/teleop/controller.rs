//! # Teleop Controller Module
//!
//! Turns one [`JoySnapshot`] at a time into velocity commands.
//!
//! ## Button Layout
//!
//! | Input | Function |
//! |-------|----------|
//! | A (hold) + LB/RB | Angular speed trim down/up |
//! | Y (hold) + LB/RB | Linear speed trim down/up |
//! | B (press) | Toggle auto teleop |
//! | X (hold) | Manual drive on both sticks |
//! | Left stick | Linear/angular command while driving manually |
//! | Right stick | Steering while in auto teleop |
//!
//! ## Dispatch
//!
//! The per-snapshot dispatch is an ordered sequence of independent guarded
//! branches, not an exclusive switch: a single snapshot can trim and drive,
//! or (auto teleop with X held) produce both the cruise command and the
//! manual command. Button presses are detected on the rising edge against
//! latches from the previous snapshot, which are updated only after every
//! guard has been evaluated.
//!
//! ## Trim locks
//!
//! Each axis carries an accumulated trim offset; its effective speed is
//! `base + trim * scale`. Whenever a driving command is computed the four
//! saturation locks are recomputed: trimming further down is locked once
//! the effective speed goes below zero, trimming further up once it exceeds
//! the configured maximum. The locks therefore reflect the state as of the
//! previous command computation, not the snapshot being processed.

use tracing::info;

use super::command::{Twist, VelocityCommand};
use crate::config::TeleopConfig;
use crate::joystick::mapper::JoySnapshot;

/// Per-direction trim locks, derived from trim and configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TrimLocks {
    down_linear: bool,
    up_linear: bool,
    down_angular: bool,
    up_angular: bool,
}

/// The input-to-command state machine.
///
/// Owns all mutable teleop state; processes exactly one snapshot at a time
/// and performs no I/O. The caller forwards the returned commands to the
/// emitter in order.
#[derive(Debug)]
pub struct TeleopController {
    params: TeleopConfig,

    auto_mode: bool,
    trim_linear: f64,
    trim_angular: f64,
    locks: TrimLocks,

    prev_btn_b: bool,
    prev_btn_lb: bool,
    prev_btn_rb: bool,
}

impl TeleopController {
    /// Creates a controller in manual mode with zero trims.
    #[must_use]
    pub fn new(params: TeleopConfig) -> Self {
        Self {
            params,
            auto_mode: false,
            trim_linear: 0.0,
            trim_angular: 0.0,
            locks: TrimLocks::default(),
            prev_btn_b: false,
            prev_btn_lb: false,
            prev_btn_rb: false,
        }
    }

    /// True while auto teleop is active.
    #[must_use]
    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Processes one input snapshot.
    ///
    /// Returns the velocity commands this snapshot produced (usually zero or
    /// one, two when branches overlap), in emission order.
    pub fn process(&mut self, joy: &JoySnapshot) -> Vec<VelocityCommand> {
        let mut commands = Vec::new();

        if joy.btn_a {
            self.change_angular_velocity(joy);
        }

        if joy.btn_b && !self.auto_mode && !self.prev_btn_b {
            self.auto_teleop_start();
        } else if joy.btn_b && self.auto_mode && !self.prev_btn_b {
            self.auto_teleop_end(&mut commands);
        }

        if !joy.btn_b && self.auto_mode {
            commands.push(self.auto_teleop(joy));
        }

        if joy.btn_x {
            commands.push(self.manual_teleop(joy));
        }

        if joy.btn_y {
            self.change_linear_velocity(joy);
        }

        if !joy.btn_b && !joy.btn_x && !self.auto_mode {
            commands.push(self.stop_command());
        }

        self.prev_btn_b = joy.btn_b;
        self.prev_btn_lb = joy.btn_lb;
        self.prev_btn_rb = joy.btn_rb;

        commands
    }

    fn auto_teleop_start(&mut self) {
        info!("auto teleop start");

        self.auto_mode = true;
    }

    fn auto_teleop_end(&mut self, commands: &mut Vec<VelocityCommand>) {
        info!("auto teleop end");

        self.auto_mode = false;

        commands.push(self.stop_command());

        // Trims survive the mode change; only the locks are cleared
        self.locks = TrimLocks::default();
    }

    /// Cruise command: trimmed constant forward speed, steering on one axis.
    fn auto_teleop(&mut self, joy: &JoySnapshot) -> VelocityCommand {
        self.locks = self.compute_locks();

        let linear_x = self
            .effective_linear()
            .min(self.params.linear_x_max)
            .max(0.0);
        let angular_z = clamp_by_sign(
            self.effective_angular() * joy.axis_steer,
            joy.axis_steer,
            self.params.angular_z_max,
        );

        self.drive_command(linear_x, angular_z)
    }

    /// Proportional command on both left-stick axes.
    fn manual_teleop(&mut self, joy: &JoySnapshot) -> VelocityCommand {
        self.locks = self.compute_locks();

        let linear_x = clamp_by_sign(
            self.effective_linear() * joy.axis_linear,
            joy.axis_linear,
            self.params.linear_x_max,
        );
        let angular_z = clamp_by_sign(
            self.effective_angular() * joy.axis_angular,
            joy.axis_angular,
            self.params.angular_z_max,
        );

        self.drive_command(linear_x, angular_z)
    }

    fn change_linear_velocity(&mut self, joy: &JoySnapshot) {
        if !self.locks.down_linear && joy.btn_lb && !self.prev_btn_lb {
            self.trim_linear -= self.params.speed_up_down_linear_x;
            info!("linear_x speed down: {} [m/s]", self.effective_linear());
        }

        if !self.locks.up_linear && joy.btn_rb && !self.prev_btn_rb {
            self.trim_linear += self.params.speed_up_down_linear_x;
            info!("linear_x speed up: {} [m/s]", self.effective_linear());
        }
    }

    fn change_angular_velocity(&mut self, joy: &JoySnapshot) {
        if !self.locks.down_angular && joy.btn_lb && !self.prev_btn_lb {
            self.trim_angular -= self.params.speed_up_down_angular_z;
            info!("angular_z speed down: {} [rad/s]", self.effective_angular());
        }

        if !self.locks.up_angular && joy.btn_rb && !self.prev_btn_rb {
            self.trim_angular += self.params.speed_up_down_angular_z;
            info!("angular_z speed up: {} [rad/s]", self.effective_angular());
        }
    }

    /// Locks as a pure function of trim and configuration.
    fn compute_locks(&self) -> TrimLocks {
        TrimLocks {
            down_linear: self.effective_linear() < 0.0,
            up_linear: self.effective_linear() > self.params.linear_x_max,
            down_angular: self.effective_angular() < 0.0,
            up_angular: self.effective_angular() > self.params.angular_z_max,
        }
    }

    fn effective_linear(&self) -> f64 {
        self.params.linear_x + self.trim_linear * self.params.speed_up_down_scale_linear_x
    }

    fn effective_angular(&self) -> f64 {
        self.params.angular_z + self.trim_angular * self.params.speed_up_down_scale_angular_z
    }

    fn drive_command(&self, linear_x: f64, angular_z: f64) -> VelocityCommand {
        let twist = Twist::new(linear_x, angular_z);

        if self.params.publish_twist_stamped {
            VelocityCommand::stamped(self.params.frame_id.clone(), twist)
        } else {
            VelocityCommand::plain(twist)
        }
    }

    /// All-stop command; stamped stops carry an empty frame id.
    fn stop_command(&self) -> VelocityCommand {
        if self.params.publish_twist_stamped {
            VelocityCommand::stamped(String::new(), Twist::ZERO)
        } else {
            VelocityCommand::plain(Twist::ZERO)
        }
    }
}

/// Clamps a shaped speed into the half-range selected by the axis sign:
/// [0, max] for positive deflection, [-max, 0] for negative, untouched when
/// the axis rests at zero.
fn clamp_by_sign(value: f64, axis: f64, max: f64) -> f64 {
    if axis > 0.0 {
        value.min(max).max(0.0)
    } else if axis < 0.0 {
        value.max(-max).min(0.0)
    } else {
        value
    }
}
