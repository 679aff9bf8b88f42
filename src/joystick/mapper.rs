//! # Input Mapper Module
//!
//! This module accumulates raw evdev events from a gamepad and converts them
//! into [`JoySnapshot`] values for the teleop controller.
//!
//! ## Button Codes (EV_KEY)
//!
//! | Button | evdev Code | Function |
//! |--------|------------|----------|
//! | A | BTN_SOUTH | Angular trim guard |
//! | B | BTN_EAST | Auto teleop toggle |
//! | X | BTN_NORTH | Manual drive |
//! | Y | BTN_WEST | Linear trim guard |
//! | LB | BTN_TL | Trim down |
//! | RB | BTN_TR | Trim up |
//!
//! ## Axis Codes (EV_ABS)
//!
//! | Axis | evdev Code | Function |
//! |------|------------|----------|
//! | Left Stick X | ABS_X | Angular command (manual) |
//! | Left Stick Y | ABS_Y | Linear command (manual) |
//! | Right Stick X | ABS_RX | Steering (auto teleop) |
//!
//! Raw axis values are normalized to [-1, 1] using the ranges the device
//! reports, with stick-up and stick-left mapping to +1 to match the robot
//! command frame (forward and counter-clockwise positive).

use evdev::{AbsoluteAxisType, InputEvent, Key};

/// Fallback raw axis range for devices that report a degenerate one.
pub const DEFAULT_AXIS_MIN: i32 = 0;
/// Fallback raw axis range for devices that report a degenerate one.
pub const DEFAULT_AXIS_MAX: i32 = 255;

/// Reported raw value range of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_AXIS_MIN,
            max: DEFAULT_AXIS_MAX,
        }
    }
}

impl AxisRange {
    /// Creates a range, substituting the fallback for degenerate input.
    #[must_use]
    pub fn new(min: i32, max: i32) -> Self {
        if max <= min {
            Self::default()
        } else {
            Self { min, max }
        }
    }

    /// Raw midpoint of the range (resting stick position).
    #[must_use]
    pub fn center(&self) -> i32 {
        (self.min + self.max) / 2
    }

    /// Maps a raw value into [-1, 1], clamping values outside the range.
    #[must_use]
    pub fn normalize(&self, value: i32) -> f64 {
        let mid = (self.min as f64 + self.max as f64) / 2.0;
        let half = (self.max as f64 - self.min as f64) / 2.0;
        ((value as f64 - mid) / half).clamp(-1.0, 1.0)
    }
}

/// Raw ranges for the three axes the mapper reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisRanges {
    /// Left stick horizontal (ABS_X)
    pub x: AxisRange,
    /// Left stick vertical (ABS_Y)
    pub y: AxisRange,
    /// Right stick horizontal (ABS_RX)
    pub rx: AxisRange,
}

/// One processed input snapshot.
///
/// Buttons are held/not-held, axes are normalized to [-1, 1] with the
/// deadzone already applied. This is the input contract of
/// [`TeleopController`](crate::teleop::TeleopController): the controller
/// never sees raw device values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoySnapshot {
    /// A button: guards angular trim
    pub btn_a: bool,
    /// B button: toggles auto teleop
    pub btn_b: bool,
    /// X button: manual drive
    pub btn_x: bool,
    /// Y button: guards linear trim
    pub btn_y: bool,
    /// Left bumper: trim down
    pub btn_lb: bool,
    /// Right bumper: trim up
    pub btn_rb: bool,

    /// Left stick vertical, up = +1 (forward)
    pub axis_linear: f64,
    /// Left stick horizontal, left = +1 (counter-clockwise)
    pub axis_angular: f64,
    /// Right stick horizontal, left = +1; steering while in auto teleop
    pub axis_steer: f64,
}

/// Parses raw evdev events and maintains gamepad state.
///
/// Accumulates events via [`JoyMapper::process_event`] and produces a
/// normalized [`JoySnapshot`] on demand.
///
/// Not thread-safe; use from a single task only.
#[derive(Debug)]
pub struct JoyMapper {
    ranges: AxisRanges,
    deadzone: f64,

    raw_x: i32,
    raw_y: i32,
    raw_rx: i32,

    btn_a: bool,
    btn_b: bool,
    btn_x: bool,
    btn_y: bool,
    btn_lb: bool,
    btn_rb: bool,
}

impl JoyMapper {
    /// Creates a mapper for the given axis ranges and deadzone.
    ///
    /// Sticks start at their resting midpoints, buttons released.
    #[must_use]
    pub fn new(ranges: AxisRanges, deadzone: f64) -> Self {
        Self {
            ranges,
            deadzone: deadzone.clamp(0.0, 0.25),
            raw_x: ranges.x.center(),
            raw_y: ranges.y.center(),
            raw_rx: ranges.rx.center(),
            btn_a: false,
            btn_b: false,
            btn_x: false,
            btn_y: false,
            btn_lb: false,
            btn_rb: false,
        }
    }

    /// Processes a single evdev input event and updates internal state.
    ///
    /// Handles absolute axis events (sticks) and key events (buttons);
    /// everything else (sync, gyro, d-pad, ...) is ignored.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind() {
            evdev::InputEventKind::AbsAxis(axis) => {
                self.process_axis_event(axis, event.value());
            }
            evdev::InputEventKind::Key(key) => {
                self.process_key_event(key, event.value() != 0);
            }
            _ => {}
        }
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) {
        match axis {
            AbsoluteAxisType::ABS_X => self.raw_x = value,
            AbsoluteAxisType::ABS_Y => self.raw_y = value,
            AbsoluteAxisType::ABS_RX => self.raw_rx = value,
            _ => {}
        }
    }

    fn process_key_event(&mut self, key: Key, pressed: bool) {
        match key {
            Key::BTN_SOUTH => self.btn_a = pressed,
            Key::BTN_EAST => self.btn_b = pressed,
            Key::BTN_NORTH => self.btn_x = pressed,
            Key::BTN_WEST => self.btn_y = pressed,
            Key::BTN_TL => self.btn_lb = pressed,
            Key::BTN_TR => self.btn_rb = pressed,
            _ => {}
        }
    }

    /// Produces a normalized snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> JoySnapshot {
        JoySnapshot {
            btn_a: self.btn_a,
            btn_b: self.btn_b,
            btn_x: self.btn_x,
            btn_y: self.btn_y,
            btn_lb: self.btn_lb,
            btn_rb: self.btn_rb,
            // Raw axes grow rightward/downward; the command frame wants
            // up/left positive, hence the negation.
            axis_linear: self.shape(-self.ranges.y.normalize(self.raw_y)),
            axis_angular: self.shape(-self.ranges.x.normalize(self.raw_x)),
            axis_steer: self.shape(-self.ranges.rx.normalize(self.raw_rx)),
        }
    }

    /// Applies the symmetric deadzone, rescaling the live band so full
    /// deflection still reaches 1.0.
    fn shape(&self, value: f64) -> f64 {
        let magnitude = value.abs();
        if magnitude <= self.deadzone {
            0.0
        } else {
            value.signum() * (magnitude - self.deadzone) / (1.0 - self.deadzone)
        }
    }
}
