//! Pin-level hardware abstraction for the kestrel motion subsystem.
//!
//! The motion core (`kestrel-axis`) talks to hardware through its own port
//! trait; this crate supplies the layer underneath: digital pin and PWM
//! channel traits, adapters binding `embedded-hal` types to them, and an
//! [`HBridge`] device that composes two PWM half-bridges plus a pair of
//! direction pins into drive / coast / brake primitives.

pub mod bridge;
pub mod ehal;
pub mod gpio;
pub mod pwm;

pub use bridge::{BridgeError, HBridge, Half};
pub use gpio::{DigitalInput, DigitalOutput, GpioError};
pub use pwm::{PwmError, PwmOutput};
