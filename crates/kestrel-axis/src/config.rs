//! Axis configuration.

use serde::Deserialize;

use crate::command::Direction;
use crate::error::AxisError;

/// Tunable parameters of one motor axis.
///
/// Deserializable so the surrounding application can load it straight
/// from its configuration file; validated once at axis construction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Encoder ticks per output revolution.
    pub ticks_per_rev: u32,
    /// Fixed duty (percent) applied while seeking the home sensor.
    pub homing_duty: u8,
    /// Homing search budget, in periodic update ticks.
    pub homing_timeout_ticks: u32,
    /// Minimum ticks spent stopping before a queued reversal may resume.
    pub dwell_ticks: u32,
    /// Travel direction that approaches the home sensor.
    pub home_direction: Direction,
    /// Initial proportional gain of the speed loop.
    pub kp: f32,
    /// Initial integral gain of the speed loop.
    pub ki: f32,
    /// Initial derivative gain of the speed loop.
    pub kd: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            ticks_per_rev: 2400,
            homing_duty: 20,
            homing_timeout_ticks: 500,
            dwell_ticks: 25,
            home_direction: Direction::Reverse,
            kp: 0.8,
            ki: 0.25,
            kd: 0.05,
        }
    }
}

impl AxisConfig {
    /// Check for values the core cannot operate with.
    pub fn validate(&self) -> Result<(), AxisError> {
        if self.ticks_per_rev == 0 {
            return Err(AxisError::InvalidConfig("ticks_per_rev must be positive"));
        }
        if self.homing_duty == 0 || self.homing_duty > 100 {
            return Err(AxisError::InvalidConfig("homing_duty must be within 1-100"));
        }
        if self.homing_timeout_ticks == 0 {
            return Err(AxisError::InvalidConfig(
                "homing_timeout_ticks must be positive",
            ));
        }
        if self.dwell_ticks == 0 {
            return Err(AxisError::InvalidConfig("dwell_ticks must be positive"));
        }
        Ok(())
    }

    /// Convert a distance in degrees of output rotation to encoder ticks.
    pub fn ticks_from_degrees(&self, degrees: i32) -> i32 {
        (degrees as i64 * self.ticks_per_rev as i64 / 360) as i32
    }
}
