//! Echo duration to distance conversion.
//!
//! The speed of sound is a fixed constant; no temperature or humidity
//! compensation is applied.

use std::time::Duration;

use tokio::time::Instant;

/// Speed of sound in air used for every conversion (cm/s).
pub const SPEED_OF_SOUND_CM_PER_S: f64 = 34_300.0;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Distance in centimeters for an echo pulse of the given width.
///
/// The pulse covers the round trip, so the travelled path is halved.
pub fn pulse_to_distance_cm(width: Duration) -> f64 {
    // Nanoseconds keep whole-microsecond widths exact (10 ms -> 171.5 cm).
    width.as_nanos() as f64 * SPEED_OF_SOUND_CM_PER_S / (2.0 * NANOS_PER_SECOND)
}

/// Distance in centimeters for an echo that went high at `start` and low at `end`.
///
/// An `end` before `start` clamps to zero; capture rejects such pulses before
/// they get here.
pub fn to_distance_cm(start: Instant, end: Instant) -> f64 {
    pulse_to_distance_cm(end.saturating_duration_since(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_10ms_echo_is_171_5cm() {
        let start = Instant::now();
        let end = start + Duration::from_millis(10);
        assert_eq!(to_distance_cm(start, end), 171.5);
    }

    #[test]
    fn test_zero_width_is_zero() {
        let t = Instant::now();
        assert_eq!(to_distance_cm(t, t), 0.0);
        assert_eq!(pulse_to_distance_cm(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_matches_formula() {
        for micros in [1u64, 58, 150, 1_000, 5_831, 23_323, 38_000] {
            let width = Duration::from_micros(micros);
            let expected = width.as_secs_f64() * 34_300.0 / 2.0;
            assert!((pulse_to_distance_cm(width) - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn test_monotonic_in_width() {
        let start = Instant::now();
        let mut last = 0.0;
        for micros in (0..40_000u64).step_by(97) {
            let d = to_distance_cm(start, start + Duration::from_micros(micros));
            assert!(d >= last, "{d} < {last} at {micros}us");
            last = d;
        }
    }

    #[test]
    fn test_reversed_span_clamps_to_zero() {
        let end = Instant::now();
        let start = end + Duration::from_millis(3);
        assert_eq!(to_distance_cm(start, end), 0.0);
    }
}
