//! Adapters binding `embedded-hal` 1.0 pin and PWM types to this crate's
//! traits, so a platform HAL's pins can feed an [`crate::HBridge`]
//! without glue code at every call site.

use crate::gpio::{DigitalInput, DigitalOutput, GpioError};
use crate::pwm::{PwmError, PwmOutput};

/// Wraps an `embedded_hal::digital::OutputPin` as a [`DigitalOutput`].
pub struct EhalOutput<T>(pub T);

impl<T: embedded_hal::digital::OutputPin> DigitalOutput for EhalOutput<T> {
    type Error = GpioError;

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.0.set_high().map_err(|_| GpioError::Write)
    }

    fn set_low(&mut self) -> Result<(), GpioError> {
        self.0.set_low().map_err(|_| GpioError::Write)
    }
}

/// Wraps an `embedded_hal::digital::InputPin` as a [`DigitalInput`].
pub struct EhalInput<T>(pub T);

impl<T: embedded_hal::digital::InputPin> DigitalInput for EhalInput<T> {
    type Error = GpioError;

    fn is_high(&mut self) -> Result<bool, GpioError> {
        self.0.is_high().map_err(|_| GpioError::Read)
    }
}

/// Wraps an `embedded_hal::pwm::SetDutyCycle` channel as a [`PwmOutput`].
///
/// `embedded-hal` channels carry no enable/disable notion; `enable` is a
/// no-op and `disable` parks the channel fully off.
pub struct EhalPwm<T>(pub T);

impl<T: embedded_hal::pwm::SetDutyCycle> PwmOutput for EhalPwm<T> {
    type Error = PwmError;

    fn enable(&mut self) -> Result<(), PwmError> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), PwmError> {
        self.0.set_duty_cycle_fully_off().map_err(|_| PwmError::Write)
    }

    fn max_duty_cycle(&mut self) -> Result<u16, PwmError> {
        Ok(self.0.max_duty_cycle())
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), PwmError> {
        self.0.set_duty_cycle(duty).map_err(|_| PwmError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Pin {
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl embedded_hal::digital::OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Channel {
        duty: u16,
    }

    impl embedded_hal::pwm::ErrorType for Channel {
        type Error = Infallible;
    }

    impl embedded_hal::pwm::SetDutyCycle for Channel {
        fn max_duty_cycle(&self) -> u16 {
            100
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn output_adapter_forwards_levels() {
        let mut pin = EhalOutput(Pin::default());
        pin.set_high().unwrap();
        assert!(pin.0.high);
        pin.set_level(false).unwrap();
        assert!(!pin.0.high);
    }

    #[test]
    fn pwm_adapter_forwards_duty() {
        let mut ch = EhalPwm(Channel::default());
        ch.enable().unwrap();
        assert_eq!(ch.max_duty_cycle().unwrap(), 100);
        ch.set_duty_cycle_percent(40).unwrap();
        assert_eq!(ch.0.duty, 40);
        ch.disable().unwrap();
        assert_eq!(ch.0.duty, 0);
    }
}
