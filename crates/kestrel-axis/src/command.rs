//! Command-side types shared between the application and the axis core.

use serde::Deserialize;

/// Direction of axis travel, in the encoder's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Travel that increases the encoder count.
    Forward,
    /// Travel that decreases the encoder count.
    Reverse,
}

impl Direction {
    /// The opposite direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// How the motor is brought to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Release both bridge halves and let the motor freewheel.
    Normal,
    /// Short the motor terminals for an active stop.
    Brake,
}

/// What the motor is driven with while running.
///
/// A closed pairing replacing the duty/speed sentinel encoding of older
/// firmware: a request carries either a fixed duty or a speed target,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveTarget {
    /// Fixed PWM duty in percent, clamped to 0-100 at commit.
    Duty(u8),
    /// Closed-loop speed target in RPM; the applied duty is corrected on
    /// every telemetry update.
    Speed(i32),
}

impl DriveTarget {
    /// Whether this target engages the speed control loop.
    pub fn is_speed_controlled(self) -> bool {
        matches!(self, DriveTarget::Speed(_))
    }
}

/// A motion request produced by the application.
///
/// Consumed once per accepted start-type command; its fields are
/// committed into the core's runtime state on entry to the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionRequest {
    /// Requested travel direction.
    pub direction: Direction,
    /// Target distance in encoder ticks; zero or negative means "run
    /// until the home sensor trips".
    pub distance: i32,
    /// Duty or speed target.
    pub target: DriveTarget,
}
