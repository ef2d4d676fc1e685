//! Quantized PID speed controller.
//!
//! The controller works in fixed point so its output is bit-for-bit
//! deterministic across platforms:
//!
//! - gains are Q10: stored as `round(gain * 1024)`, a quantization step
//!   of 1/1024;
//! - the error input is saturated to ±[`Pid::INPUT_MAX`] counts;
//! - the correction output is saturated to ±[`Pid::OUTPUT_MAX`] counts;
//! - intermediate products are `i64`, and the final scaling divides by
//!   the gain scale with truncation toward zero.
//!
//! The integral term accumulates pre-scaled (gain times error) and is
//! clamped to what the output range can express, so a long saturated
//! stretch cannot wind the accumulator past recovery.

/// Fixed-point PID controller over a speed error signal.
#[derive(Debug, Clone)]
pub struct Pid {
    kp: i32,
    ki: i32,
    kd: i32,
    integral: i64,
    prev_error: i32,
    primed: bool,
}

impl Pid {
    /// Fixed-point scale of the gain coefficients (Q10).
    pub const GAIN_SCALE: i32 = 1 << 10;

    /// Error input saturation bound, in counts.
    pub const INPUT_MAX: i32 = 8192;

    /// Correction output saturation bound, in counts.
    pub const OUTPUT_MAX: i32 = 8192;

    const INTEGRAL_CLAMP: i64 = (Self::OUTPUT_MAX as i64) * (Self::GAIN_SCALE as i64);

    /// Controller with the given gains, quantized to the Q10 grid.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        let mut pid = Self {
            kp: 0,
            ki: 0,
            kd: 0,
            integral: 0,
            prev_error: 0,
            primed: false,
        };
        pid.set_gains(kp, ki, kd);
        pid
    }

    /// Replace the gain coefficients.
    ///
    /// Values are rounded to the nearest Q10 step; magnitudes beyond
    /// 2^21 are clamped so gain-times-error products stay well inside
    /// `i64`.
    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kp = Self::quantize(kp);
        self.ki = Self::quantize(ki);
        self.kd = Self::quantize(kd);
    }

    /// Current gains, as quantized.
    pub fn gains(&self) -> (f32, f32, f32) {
        (
            self.kp as f32 / Self::GAIN_SCALE as f32,
            self.ki as f32 / Self::GAIN_SCALE as f32,
            self.kd as f32 / Self::GAIN_SCALE as f32,
        )
    }

    /// Zero the integrator and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0;
        self.prev_error = 0;
        self.primed = false;
    }

    /// Advance the controller by one sample and return the correction.
    ///
    /// `error` is saturated to ±[`Self::INPUT_MAX`] before use; the
    /// return value is saturated to ±[`Self::OUTPUT_MAX`]. Deterministic
    /// given the controller state and input.
    pub fn update(&mut self, error: i32) -> i32 {
        let e = error.clamp(-Self::INPUT_MAX, Self::INPUT_MAX);

        let p = self.kp as i64 * e as i64;

        self.integral = (self.integral + self.ki as i64 * e as i64)
            .clamp(-Self::INTEGRAL_CLAMP, Self::INTEGRAL_CLAMP);

        // Derivative on error; the first sample after a reset has no
        // history to differentiate against.
        let d = if self.primed {
            self.kd as i64 * (e - self.prev_error) as i64
        } else {
            self.primed = true;
            0
        };
        self.prev_error = e;

        let out = (p + self.integral + d) / Self::GAIN_SCALE as i64;
        out.clamp(-(Self::OUTPUT_MAX as i64), Self::OUTPUT_MAX as i64) as i32
    }

    fn quantize(gain: f32) -> i32 {
        const RAW_MAX: f32 = (1 << 21) as f32;
        (gain * Self::GAIN_SCALE as f32).round().clamp(-RAW_MAX, RAW_MAX) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f32 = 1.0 / Pid::GAIN_SCALE as f32;

    #[test]
    fn gains_round_trip_within_the_quantization_step() {
        let pid = Pid::new(0.8, 0.25, 0.05);
        let (kp, ki, kd) = pid.gains();
        assert!((kp - 0.8).abs() <= STEP);
        assert!((ki - 0.25).abs() <= STEP);
        assert!((kd - 0.05).abs() <= STEP);
    }

    #[test]
    fn proportional_term_is_exact_for_unit_gain() {
        // kp = 1.0 quantizes to exactly 1024/1024.
        let mut pid = Pid::new(1.0, 0.0, 0.0);
        assert_eq!(pid.update(100), 100);
        assert_eq!(pid.update(-250), -250);
    }

    #[test]
    fn integral_term_accumulates() {
        // kp = 1.0, ki = 0.5: first sample 100 + 50, second 100 + 100.
        let mut pid = Pid::new(1.0, 0.5, 0.0);
        assert_eq!(pid.update(100), 150);
        assert_eq!(pid.update(100), 200);
    }

    #[test]
    fn derivative_needs_one_sample_of_history() {
        let mut pid = Pid::new(0.0, 0.0, 1.0);
        assert_eq!(pid.update(100), 0);
        // d = kd * (40 - 100)
        assert_eq!(pid.update(40), -60);
    }

    #[test]
    fn output_saturates() {
        let mut pid = Pid::new(16.0, 0.0, 0.0);
        assert_eq!(pid.update(Pid::INPUT_MAX), Pid::OUTPUT_MAX);
        assert_eq!(pid.update(-Pid::INPUT_MAX), -Pid::OUTPUT_MAX);
    }

    #[test]
    fn input_saturates() {
        let mut a = Pid::new(1.0, 0.0, 0.0);
        let mut b = Pid::new(1.0, 0.0, 0.0);
        assert_eq!(a.update(1_000_000), b.update(Pid::INPUT_MAX));
    }

    #[test]
    fn integral_windup_is_clamped() {
        let mut pid = Pid::new(0.0, 1.0, 0.0);
        for _ in 0..100 {
            pid.update(Pid::INPUT_MAX);
        }
        // One opposite-sign sample must pull the output off the rail by
        // at least its own integral contribution; an unclamped
        // accumulator would still return OUTPUT_MAX here.
        let recovered = pid.update(-Pid::INPUT_MAX);
        assert!(recovered < Pid::OUTPUT_MAX);
    }

    #[test]
    fn reset_clears_all_history() {
        let mut pid = Pid::new(1.0, 0.5, 0.25);
        pid.update(500);
        pid.update(-300);
        pid.reset();

        let mut fresh = Pid::new(1.0, 0.5, 0.25);
        assert_eq!(pid.update(123), fresh.update(123));
    }
}
