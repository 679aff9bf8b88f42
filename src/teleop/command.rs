//! # Velocity Command Module
//!
//! Command types emitted to the base controller.
//!
//! A command is a pair of scalar speeds: linear (m/s, forward positive) and
//! angular (rad/s, counter-clockwise positive). Depending on configuration
//! commands are emitted bare or stamped with a frame id and a UTC capture
//! timestamp. Zero (stop) commands always carry an empty frame id so the
//! receiver can tell a commanded stop apart from ordinary driving.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A pair of velocity setpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Twist {
    /// Linear speed in m/s, forward positive
    pub linear_x: f64,
    /// Angular speed in rad/s, counter-clockwise positive
    pub angular_z: f64,
}

impl Twist {
    /// The all-stop twist.
    pub const ZERO: Twist = Twist {
        linear_x: 0.0,
        angular_z: 0.0,
    };

    #[must_use]
    pub fn new(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear_x,
            angular_z,
        }
    }
}

/// Frame label and capture time for stamped commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub frame_id: String,
    pub stamp: DateTime<Utc>,
}

/// One velocity command, bare or stamped per configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VelocityCommand {
    Twist(Twist),
    TwistStamped { header: Header, twist: Twist },
}

impl VelocityCommand {
    /// Bare command without framing.
    #[must_use]
    pub fn plain(twist: Twist) -> Self {
        Self::Twist(twist)
    }

    /// Stamped command with the given frame id and the current UTC time.
    #[must_use]
    pub fn stamped(frame_id: String, twist: Twist) -> Self {
        Self::TwistStamped {
            header: Header {
                frame_id,
                stamp: Utc::now(),
            },
            twist,
        }
    }

    /// The velocity payload, regardless of framing.
    #[must_use]
    pub fn twist(&self) -> &Twist {
        match self {
            Self::Twist(twist) => twist,
            Self::TwistStamped { twist, .. } => twist,
        }
    }

    /// The frame id, if the command is stamped.
    #[must_use]
    pub fn frame_id(&self) -> Option<&str> {
        match self {
            Self::Twist(_) => None,
            Self::TwistStamped { header, .. } => Some(&header.frame_id),
        }
    }
}
