//! Shared mailbox holding the latest sampler result.

use parking_lot::Mutex;

use crate::error::SensorError;

/// Latest published result of the background sampler.
///
/// The default, `(0.0, None)`, is what a reader sees before the first cycle
/// completes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sample {
    /// Last good distance in centimeters.
    pub distance_cm: f64,
    /// Error of the cycle that published this sample, if it failed.
    pub error: Option<SensorError>,
}

#[derive(Debug, Default)]
struct Slot {
    sample: Sample,
    published: u64,
}

/// Single-slot mailbox between the sampler (writer) and its readers.
///
/// Every operation takes the same lock, so a reader never sees a sample that
/// is half written.
#[derive(Debug, Default)]
pub struct SampleSlot {
    inner: Mutex<Slot>,
}

impl SampleSlot {
    /// An empty slot holding `(0.0, None)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a successful cycle. Any earlier error belongs to an older
    /// cycle and is dropped with it.
    pub fn record_distance(&self, distance_cm: f64) {
        self.publish(Sample { distance_cm, error: None });
    }

    /// Store a cycle error, keeping the last good distance.
    pub fn record_error(&self, error: SensorError) {
        let mut g = self.inner.lock();
        g.sample.error = Some(error);
        g.published += 1;
    }

    /// Replace the whole sample.
    pub fn publish(&self, sample: Sample) {
        let mut g = self.inner.lock();
        g.sample = sample;
        g.published += 1;
    }

    /// Read the sample and clear its error in one step.
    pub fn take(&self) -> (f64, Option<SensorError>) {
        let mut g = self.inner.lock();
        (g.sample.distance_cm, g.sample.error.take())
    }

    /// Read the sample without clearing anything.
    pub fn snapshot(&self) -> Sample {
        self.inner.lock().sample.clone()
    }

    /// Back to the initial `(0.0, None)` sample.
    pub fn reset(&self) {
        self.inner.lock().sample = Sample::default();
    }

    /// Number of publishing steps so far.
    pub fn published(&self) -> u64 {
        self.inner.lock().published
    }
}
