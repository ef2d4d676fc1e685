//! Digital pin abstractions.
//!
//! Platform pin types are wrapped behind these traits (see [`crate::ehal`]
//! for the `embedded-hal` adapters); everything above this layer is
//! hardware-agnostic.

use thiserror::Error;

/// Errors raised by digital pin operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GpioError {
    /// The pin rejected a level change.
    #[error("gpio write failed")]
    Write,
    /// The pin level could not be read.
    #[error("gpio read failed")]
    Read,
}

/// A push-pull digital output pin.
pub trait DigitalOutput {
    type Error;

    /// Drive the pin high.
    fn set_high(&mut self) -> Result<(), Self::Error>;

    /// Drive the pin low.
    fn set_low(&mut self) -> Result<(), Self::Error>;

    /// Drive the pin to the given level (true = high).
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        if high { self.set_high() } else { self.set_low() }
    }
}

/// A digital input pin.
pub trait DigitalInput {
    type Error;

    /// Read the pin level (true = high).
    fn is_high(&mut self) -> Result<bool, Self::Error>;
}
