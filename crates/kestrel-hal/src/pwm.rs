//! PWM output channel abstraction.

use thiserror::Error;

/// Errors raised by PWM channel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PwmError {
    /// The channel is not enabled.
    #[error("pwm channel disabled")]
    Disabled,
    /// The channel rejected a duty-cycle write.
    #[error("pwm write failed")]
    Write,
}

/// A single PWM output channel.
pub trait PwmOutput {
    type Error;

    /// Enable the channel output.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Disable the channel output.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Maximum raw duty-cycle value.
    fn max_duty_cycle(&mut self) -> Result<u16, Self::Error>;

    /// Set the raw duty-cycle value.
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error>;

    /// Set the duty cycle as a percentage of the maximum (0-100).
    fn set_duty_cycle_percent(&mut self, percent: u8) -> Result<(), Self::Error> {
        let percent = percent.min(100);
        let max = self.max_duty_cycle()?;
        self.set_duty_cycle(((percent as u32 * max as u32) / 100) as u16)
    }
}
