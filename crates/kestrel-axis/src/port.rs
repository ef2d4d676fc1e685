//! The hardware seam of the axis core.

use crate::command::Direction;

/// Bridge output channel addressed by [`HardwarePort::set_duty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeChannel {
    /// Half-bridge driven for forward travel.
    A,
    /// Half-bridge driven for reverse travel.
    B,
}

/// Faults reported through [`HardwarePort::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The homing search exceeded its timeout without the sensor ever
    /// reporting active.
    HomeNotFound,
}

/// Everything the control core needs from the surrounding driver.
///
/// The port is a side-effecting sink plus encoder readback: the core
/// keeps no hardware state of its own and invokes the port only from
/// within event dispatch. Completion and fault notifications travel
/// through the same trait, so they reach the application without the
/// core knowing who listens.
pub trait HardwarePort {
    /// Current encoder position in ticks. Positive counts correspond to
    /// [`Direction::Forward`] travel.
    fn position(&mut self) -> i32;

    /// Zero the encoder position reference.
    fn reset_position(&mut self);

    /// Read the home sensor level (true = active).
    fn read_home_sensor(&mut self) -> bool;

    /// Apply a PWM duty (percent, 0-100) to one bridge channel.
    fn set_duty(&mut self, channel: BridgeChannel, percent: u8);

    /// Point the direction pins.
    fn set_direction_pins(&mut self, direction: Direction);

    /// A distance-limited or until-home move finished.
    fn on_move_complete(&mut self);

    /// An unrecoverable fault occurred; the axis is now faulted.
    fn on_error(&mut self, fault: FaultKind);
}
