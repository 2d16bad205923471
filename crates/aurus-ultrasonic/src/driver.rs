//! Public handle that owns the background sampler.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::error::{InitError, SensorError};
use crate::pin::{EchoPin, TriggerPin};
use crate::sample::Sample;
use crate::sampler::{Sampler, SamplerState, Shared};
use crate::trigger::TriggerEmitter;

/// Handle to a running HC-SR04 driver.
///
/// Construction starts a background task on the current tokio runtime that
/// samples the sensor every `sample_interval_ms`. The handle reads the latest
/// result without waiting on that task. Dropping the handle cancels the task.
///
/// Cancellation is cooperative: the task notices it at its next suspension
/// point, which at worst is one trigger, capture and pause later.
pub struct Hcsr04 {
    shared: Arc<Shared>,
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Hcsr04 {
    /// Prepare the pins and start sampling.
    ///
    /// The trigger is driven low and the echo line is read once to check
    /// that both pins respond. Must be called from within a tokio runtime.
    /// On error no task is started.
    pub fn new<T, E>(trigger: T, mut echo: E, config: DriverConfig) -> Result<Self, InitError>
    where
        T: TriggerPin,
        E: EchoPin,
    {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| InitError::NoRuntime)?;

        let mut trigger = TriggerEmitter::new(trigger);
        trigger.park()?;
        let level = echo.read()?;
        debug!(?level, "echo line ready");

        let shared = Arc::new(Shared::default());
        let (cancel, cancel_rx) = watch::channel(false);
        let sampler = Sampler::new(trigger, echo, config, shared.clone());
        let task = runtime.spawn(sampler.run(cancel_rx));
        info!(?config, "ultrasonic driver started");

        Ok(Self { shared, cancel, task: Some(task) })
    }

    /// Latest distance and any error recorded since the previous call.
    ///
    /// The error is cleared by this read, so a fault shows up once per
    /// occurrence. The distance stays at the last good value while faults
    /// persist. Before the first cycle completes this returns `(0.0, None)`.
    pub fn read_distance_cm(&self) -> (f64, Option<SensorError>) {
        self.shared.slot.take()
    }

    /// Latest sample without clearing its error.
    pub fn latest(&self) -> Sample {
        self.shared.slot.snapshot()
    }

    /// Current step of the background cycle.
    pub fn state(&self) -> SamplerState {
        self.shared.state()
    }

    /// Number of cycles whose result has been published.
    pub fn samples_published(&self) -> u64 {
        self.shared.slot.published()
    }

    /// Ask the sampler to stop without waiting for it. Repeated calls do
    /// nothing.
    pub fn close(&self) {
        if !self.cancel.send_replace(true) {
            info!("ultrasonic driver closing");
        }
    }

    /// Stop the sampler and wait until its task has finished.
    pub async fn close_and_wait(mut self) {
        self.close();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "sampler task ended abnormally");
            }
        }
    }
}

impl Drop for Hcsr04 {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PinError;
    use crate::sim::{EchoResponse, SimulatedSensor};
    use std::time::Duration;

    fn sensor() -> SimulatedSensor {
        SimulatedSensor::new(EchoResponse::pulse(Duration::from_micros(300), Duration::from_millis(5)))
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let (trigger, echo) = sensor().pins();
        let result = Hcsr04::new(trigger, echo, DriverConfig::default());
        assert!(matches!(result, Err(InitError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_new_rejects_unresponsive_pins() {
        let sim = sensor();
        sim.fail_reads(true);
        let (trigger, echo) = sim.pins();
        let result = Hcsr04::new(trigger, echo, DriverConfig::default());
        assert!(matches!(result, Err(InitError::Pin(PinError::Read(_)))));

        let sim = sensor();
        sim.fail_writes(true);
        let (trigger, echo) = sim.pins();
        let result = Hcsr04::new(trigger, echo, DriverConfig::default());
        assert!(matches!(result, Err(InitError::Pin(PinError::Write(_)))));
        assert_eq!(sim.stats().subscriptions, 0);
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let (trigger, echo) = sensor().pins();
        let config = DriverConfig { edge_timeout_ms: 0, ..Default::default() };
        assert!(matches!(Hcsr04::new(trigger, echo, config), Err(InitError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_before_first_sample_is_zero() {
        let sim = sensor();
        let (trigger, echo) = sim.pins();
        let driver = Hcsr04::new(trigger, echo, DriverConfig::default()).unwrap();
        // The task has not been polled yet.
        assert_eq!(driver.read_distance_cm(), (0.0, None));
        assert_eq!(driver.samples_published(), 0);
        driver.close_and_wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent() {
        let sim = sensor();
        let (trigger, echo) = sim.pins();
        let driver = Hcsr04::new(trigger, echo, DriverConfig::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        driver.close();
        driver.close();
        driver.close_and_wait().await;
        assert!(!sim.is_subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_sampler() {
        let sim = sensor();
        let (trigger, echo) = sim.pins();
        let driver = Hcsr04::new(trigger, echo, DriverConfig::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(driver);
        let triggers = sim.stats().triggers;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sim.stats().triggers, triggers);
    }
}
