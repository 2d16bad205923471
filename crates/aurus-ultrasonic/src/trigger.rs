//! Trigger pulse generation.

use std::time::Duration;

use spin_sleep::SpinSleeper;
use tracing::warn;

use crate::error::PinError;
use crate::pin::{Level, TriggerPin};

/// Length of the trigger pulse the sensor expects.
pub const TRIGGER_PULSE: Duration = Duration::from_micros(10);

// Spin for the whole pulse; OS sleeps are far coarser than 10us.
const SPIN_ACCURACY_NS: u32 = 100_000;

/// Fire one trigger pulse: high, busy-wait [`TRIGGER_PULSE`], low.
///
/// If the high write fails the line is still driven low before the error is
/// returned.
pub fn emit_trigger<P: TriggerPin + ?Sized>(pin: &mut P) -> Result<(), PinError> {
    if let Err(e) = pin.write(Level::High) {
        if let Err(low) = pin.write(Level::Low) {
            warn!(error = %low, "failed to release trigger line");
        }
        return Err(e);
    }
    SpinSleeper::new(SPIN_ACCURACY_NS).sleep(TRIGGER_PULSE);
    pin.write(Level::Low)
}

/// Owns the trigger line for the lifetime of the sampler.
pub struct TriggerEmitter<P> {
    pin: P,
}

impl<P: TriggerPin> TriggerEmitter<P> {
    /// Take ownership of the trigger line. Nothing is written yet.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Drive the line low so the first pulse starts from a known level.
    pub fn park(&mut self) -> Result<(), PinError> {
        self.pin.write(Level::Low)
    }

    /// Fire one pulse, see [`emit_trigger`].
    pub fn emit(&mut self) -> Result<(), PinError> {
        emit_trigger(&mut self.pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingPin {
        writes: Vec<(Level, Instant)>,
        fail_high: bool,
    }

    impl TriggerPin for RecordingPin {
        fn write(&mut self, level: Level) -> Result<(), PinError> {
            self.writes.push((level, Instant::now()));
            if self.fail_high && level == Level::High {
                return Err(PinError::Write("stuck".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_pulse_is_high_then_low_for_at_least_10us() {
        let mut pin = RecordingPin::default();
        emit_trigger(&mut pin).unwrap();
        assert_eq!(pin.writes.len(), 2);
        assert_eq!(pin.writes[0].0, Level::High);
        assert_eq!(pin.writes[1].0, Level::Low);
        let width = pin.writes[1].1 - pin.writes[0].1;
        assert!(width >= TRIGGER_PULSE, "pulse too short: {width:?}");
    }

    #[test]
    fn test_failed_high_write_still_releases_line() {
        let mut pin = RecordingPin { fail_high: true, ..Default::default() };
        let result = emit_trigger(&mut pin);
        assert!(matches!(result, Err(PinError::Write(_))));
        assert_eq!(pin.writes.last().map(|w| w.0), Some(Level::Low));
    }

    #[test]
    fn test_emitter_parks_low() {
        let mut emitter = TriggerEmitter::new(RecordingPin::default());
        emitter.park().unwrap();
        emitter.emit().unwrap();
        let levels: Vec<Level> = emitter.pin.writes.iter().map(|w| w.0).collect();
        assert_eq!(levels, vec![Level::Low, Level::High, Level::Low]);
    }
}
