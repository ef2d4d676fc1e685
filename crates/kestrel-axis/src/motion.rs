//! Motion arithmetic: the open-loop speed→duty map and the scale factors
//! joining encoder telemetry to the PID controller.

use crate::pid::Pid;

/// Speed error (RPM) that maps to the PID input saturation bound.
pub const SPEED_ERROR_FULL_SCALE_RPM: i32 = 250;

/// Open-loop duty (percent) that nominally produces `rpm`.
///
/// Affine fit of the drive's duty/speed curve, `(433·rpm + 9600) / 1000`,
/// clamped to 0-100. A zero or negative target maps to zero duty exactly:
/// the fit's intercept covers static friction, which has no meaning at
/// rest. Monotonically non-decreasing and saturated at 100 percent from
/// roughly 209 RPM upward.
pub fn duty_from_speed(rpm: i32) -> u8 {
    if rpm <= 0 {
        return 0;
    }
    let duty = (433 * rpm as i64 + 9600) / 1000;
    duty.clamp(0, 100) as u8
}

/// Scale a speed error (RPM) into the PID input range, saturating at the
/// controller's bounds.
pub fn scale_speed_error(target_rpm: i32, measured_rpm: i32) -> i32 {
    let err = target_rpm as i64 - measured_rpm as i64;
    let scaled = err * Pid::INPUT_MAX as i64 / SPEED_ERROR_FULL_SCALE_RPM as i64;
    scaled.clamp(-(Pid::INPUT_MAX as i64), Pid::INPUT_MAX as i64) as i32
}

/// Rescale a PID correction (counts) into duty percentage points, so a
/// full-scale correction swings the duty by ±100.
pub fn correction_to_duty(correction: i32) -> i32 {
    (correction as i64 * 100 / Pid::OUTPUT_MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_speed_maps_to_zero_duty() {
        assert_eq!(duty_from_speed(0), 0);
        assert_eq!(duty_from_speed(-50), 0);
    }

    #[test]
    fn duty_is_monotonic_and_saturates() {
        let mut last = 0;
        for rpm in 0..=300 {
            let duty = duty_from_speed(rpm);
            assert!(duty >= last, "duty decreased at {rpm} rpm");
            assert!(duty <= 100);
            last = duty;
        }
        // (433*209 + 9600) / 1000 = 100.097 -> the saturation knee.
        assert_eq!(duty_from_speed(209), 100);
        assert_eq!(duty_from_speed(10_000), 100);
    }

    #[test]
    fn known_points_of_the_affine_fit() {
        // (433*1 + 9600) / 1000 = 10.03 -> 10
        assert_eq!(duty_from_speed(1), 10);
        // (433*100 + 9600) / 1000 = 52.9 -> 52
        assert_eq!(duty_from_speed(100), 52);
    }

    #[test]
    fn error_scaling_covers_the_full_pid_range() {
        assert_eq!(scale_speed_error(SPEED_ERROR_FULL_SCALE_RPM, 0), Pid::INPUT_MAX);
        assert_eq!(scale_speed_error(0, SPEED_ERROR_FULL_SCALE_RPM), -Pid::INPUT_MAX);
        // 125 * 8192 / 250 = 4096
        assert_eq!(scale_speed_error(125, 0), Pid::INPUT_MAX / 2);
        // Beyond full scale the input rails.
        assert_eq!(scale_speed_error(100_000, 0), Pid::INPUT_MAX);
    }

    #[test]
    fn correction_rescales_to_percentage_points() {
        assert_eq!(correction_to_duty(Pid::OUTPUT_MAX), 100);
        assert_eq!(correction_to_duty(-Pid::OUTPUT_MAX), -100);
        assert_eq!(correction_to_duty(Pid::OUTPUT_MAX / 2), 50);
        assert_eq!(correction_to_duty(0), 0);
    }
}
