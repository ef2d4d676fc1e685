//! H-bridge motor driver device.
//!
//! Composes two PWM half-bridge inputs and a pair of direction pins into
//! the standard DRV-style drive primitives:
//!
//! | A    | B    | result        |
//! |------|------|---------------|
//! | 0    | 0    | coast (high-Z)|
//! | PWM  | 0    | drive forward |
//! | 0    | PWM  | drive reverse |
//! | 100  | 100  | brake (short) |

use thiserror::Error;
use tracing::debug;

use crate::gpio::{DigitalOutput, GpioError};
use crate::pwm::{PwmError, PwmOutput};

/// Half-bridge selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    /// Half driven for forward rotation.
    A,
    /// Half driven for reverse rotation.
    B,
}

/// Errors raised by bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Gpio(#[from] GpioError),
    #[error(transparent)]
    Pwm(#[from] PwmError),
    #[error("duty cycle out of range: {0}")]
    InvalidDuty(u8),
}

/// H-bridge bound to two PWM channels and two direction pins.
pub struct HBridge<A, B, D>
where
    A: PwmOutput,
    B: PwmOutput,
    D: DigitalOutput,
{
    pwm_a: A,
    pwm_b: B,
    dir_a: D,
    dir_b: D,
    duty_a: u8,
    duty_b: u8,
}

impl<A, B, D> HBridge<A, B, D>
where
    A: PwmOutput,
    B: PwmOutput,
    D: DigitalOutput,
    A::Error: Into<BridgeError>,
    B::Error: Into<BridgeError>,
    D::Error: Into<BridgeError>,
{
    /// Construct a bridge from its PWM inputs and direction pins.
    ///
    /// Both channels are enabled at zero duty and the direction pins are
    /// driven low. Any pin failure here is fatal to initialization: the
    /// error propagates and the device must not be used.
    pub fn new(mut pwm_a: A, mut pwm_b: B, mut dir_a: D, mut dir_b: D) -> Result<Self, BridgeError> {
        pwm_a.enable().map_err(Into::into)?;
        pwm_b.enable().map_err(Into::into)?;
        pwm_a.set_duty_cycle_percent(0).map_err(Into::into)?;
        pwm_b.set_duty_cycle_percent(0).map_err(Into::into)?;
        dir_a.set_low().map_err(Into::into)?;
        dir_b.set_low().map_err(Into::into)?;

        Ok(Self {
            pwm_a,
            pwm_b,
            dir_a,
            dir_b,
            duty_a: 0,
            duty_b: 0,
        })
    }

    /// Set one half-bridge's duty cycle (percent, 0-100).
    pub fn set_half_duty(&mut self, half: Half, percent: u8) -> Result<(), BridgeError> {
        if percent > 100 {
            return Err(BridgeError::InvalidDuty(percent));
        }
        match half {
            Half::A => {
                self.pwm_a.set_duty_cycle_percent(percent).map_err(Into::into)?;
                self.duty_a = percent;
            }
            Half::B => {
                self.pwm_b.set_duty_cycle_percent(percent).map_err(Into::into)?;
                self.duty_b = percent;
            }
        }
        Ok(())
    }

    /// Current duty of the given half (percent).
    pub fn half_duty(&self, half: Half) -> u8 {
        match half {
            Half::A => self.duty_a,
            Half::B => self.duty_b,
        }
    }

    /// Point the direction pins (true = forward).
    pub fn set_direction(&mut self, forward: bool) -> Result<(), BridgeError> {
        self.dir_a.set_level(forward).map_err(Into::into)?;
        self.dir_b.set_level(!forward).map_err(Into::into)?;
        Ok(())
    }

    /// Drive at `percent` duty in the given direction; the opposite half
    /// is released first.
    pub fn drive(&mut self, forward: bool, percent: u8) -> Result<(), BridgeError> {
        self.set_direction(forward)?;
        let (hot, cold) = if forward { (Half::A, Half::B) } else { (Half::B, Half::A) };
        self.set_half_duty(cold, 0)?;
        self.set_half_duty(hot, percent)?;
        debug!(forward, percent, "bridge drive");
        Ok(())
    }

    /// Release both halves; the motor freewheels.
    pub fn coast(&mut self) -> Result<(), BridgeError> {
        self.set_half_duty(Half::A, 0)?;
        self.set_half_duty(Half::B, 0)?;
        debug!("bridge coast");
        Ok(())
    }

    /// Short both motor terminals for an active stop.
    pub fn brake(&mut self) -> Result<(), BridgeError> {
        self.dir_a.set_high().map_err(Into::into)?;
        self.dir_b.set_high().map_err(Into::into)?;
        self.set_half_duty(Half::A, 100)?;
        self.set_half_duty(Half::B, 100)?;
        debug!("bridge brake");
        Ok(())
    }

    /// Release the underlying pins.
    pub fn free(self) -> (A, B, D, D) {
        (self.pwm_a, self.pwm_b, self.dir_a, self.dir_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MockPwm {
        enabled: bool,
        duty: u16,
    }

    impl PwmOutput for MockPwm {
        type Error = PwmError;

        fn enable(&mut self) -> Result<(), PwmError> {
            self.enabled = true;
            Ok(())
        }

        fn disable(&mut self) -> Result<(), PwmError> {
            self.enabled = false;
            Ok(())
        }

        fn max_duty_cycle(&mut self) -> Result<u16, PwmError> {
            Ok(1000)
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), PwmError> {
            if !self.enabled {
                return Err(PwmError::Disabled);
            }
            self.duty = duty;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockPin {
        high: bool,
    }

    impl DigitalOutput for MockPin {
        type Error = GpioError;

        fn set_high(&mut self) -> Result<(), GpioError> {
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), GpioError> {
            self.high = false;
            Ok(())
        }
    }

    fn bridge() -> HBridge<MockPwm, MockPwm, MockPin> {
        HBridge::new(
            MockPwm::default(),
            MockPwm::default(),
            MockPin::default(),
            MockPin::default(),
        )
        .unwrap()
    }

    #[test]
    fn new_enables_channels_at_zero_duty() {
        let b = bridge();
        assert_eq!(b.half_duty(Half::A), 0);
        assert_eq!(b.half_duty(Half::B), 0);
        let (pwm_a, pwm_b, dir_a, dir_b) = b.free();
        assert!(pwm_a.enabled);
        assert!(pwm_b.enabled);
        assert!(!dir_a.high);
        assert!(!dir_b.high);
    }

    #[test]
    fn drive_forward_powers_half_a_only() {
        let mut b = bridge();
        b.drive(true, 60).unwrap();
        assert_eq!(b.half_duty(Half::A), 60);
        assert_eq!(b.half_duty(Half::B), 0);
        let (pwm_a, _, dir_a, dir_b) = b.free();
        // 60% of the 1000-count mock range
        assert_eq!(pwm_a.duty, 600);
        assert!(dir_a.high);
        assert!(!dir_b.high);
    }

    #[test]
    fn drive_reverse_powers_half_b_only() {
        let mut b = bridge();
        b.drive(false, 35).unwrap();
        assert_eq!(b.half_duty(Half::A), 0);
        assert_eq!(b.half_duty(Half::B), 35);
        let (_, _, dir_a, dir_b) = b.free();
        assert!(!dir_a.high);
        assert!(dir_b.high);
    }

    #[test]
    fn coast_releases_both_halves() {
        let mut b = bridge();
        b.drive(true, 80).unwrap();
        b.coast().unwrap();
        assert_eq!(b.half_duty(Half::A), 0);
        assert_eq!(b.half_duty(Half::B), 0);
    }

    #[test]
    fn brake_saturates_both_halves() {
        let mut b = bridge();
        b.drive(false, 40).unwrap();
        b.brake().unwrap();
        assert_eq!(b.half_duty(Half::A), 100);
        assert_eq!(b.half_duty(Half::B), 100);
        let (_, _, dir_a, dir_b) = b.free();
        assert!(dir_a.high);
        assert!(dir_b.high);
    }

    #[test]
    fn out_of_range_duty_is_rejected() {
        let mut b = bridge();
        assert_eq!(
            b.set_half_duty(Half::A, 101),
            Err(BridgeError::InvalidDuty(101))
        );
        assert_eq!(b.half_duty(Half::A), 0);
    }
}
