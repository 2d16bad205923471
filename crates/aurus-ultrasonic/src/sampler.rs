//! Background sampling task.
//!
//! The sampler owns both pins and runs trigger, capture and publish in a
//! loop until cancelled. Cycles never overlap: a new trigger is only sent
//! after the previous capture finished or timed out and the pause elapsed.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, trace, warn};

use crate::capture::EchoCapture;
use crate::config::DriverConfig;
use crate::error::SensorError;
use crate::pin::{EchoPin, TriggerPin};
use crate::sample::SampleSlot;
use crate::trigger::TriggerEmitter;

/// Where the sampler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerState {
    /// Pausing between cycles, or not started yet.
    #[default]
    Idle,
    /// Checking the echo line, subscribing and sending the trigger pulse.
    Triggering,
    /// Waiting for the echo edges.
    Capturing,
    /// Writing the cycle result to the sample slot.
    Publishing,
    /// Stopped for good.
    Cancelled,
}

/// State shared between the sampler task and the driver handle.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) slot: SampleSlot,
    state: RwLock<SamplerState>,
}

impl Shared {
    pub(crate) fn state(&self) -> SamplerState {
        *self.state.read()
    }

    fn set_state(&self, state: SamplerState) {
        trace!(?state, "sampler state");
        *self.state.write() = state;
    }
}

pub(crate) struct Sampler<T, E> {
    trigger: TriggerEmitter<T>,
    echo: E,
    config: DriverConfig,
    shared: Arc<Shared>,
}

impl<T: TriggerPin, E: EchoPin> Sampler<T, E> {
    pub(crate) fn new(
        trigger: TriggerEmitter<T>,
        echo: E,
        config: DriverConfig,
        shared: Arc<Shared>,
    ) -> Self {
        Self { trigger, echo, config, shared }
    }

    /// Sample until `cancel` turns true (or its sender goes away).
    ///
    /// Cancellation is checked at the top of every cycle and also ends an
    /// in-flight capture or pause early. Dropping the capture releases the
    /// echo subscription. On exit the published sample is reset to zero.
    pub(crate) async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_ms = self.config.sample_interval_ms,
            timeout_ms = self.config.edge_timeout_ms,
            "sampler started"
        );
        loop {
            if *cancel.borrow() {
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                outcome = self.cycle() => outcome,
            };

            self.shared.set_state(SamplerState::Publishing);
            match outcome {
                Ok(distance_cm) => {
                    debug!(distance_cm, "sample");
                    self.shared.slot.record_distance(distance_cm);
                }
                Err(e) => {
                    warn!(error = %e, "measurement cycle failed");
                    self.shared.slot.record_error(e);
                }
            }

            self.shared.set_state(SamplerState::Idle);
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                _ = time::sleep(self.config.sample_interval()) => {}
            }
        }

        self.shared.slot.reset();
        self.shared.set_state(SamplerState::Cancelled);
        info!("sampler stopped");
    }

    async fn cycle(&mut self) -> Result<f64, SensorError> {
        self.shared.set_state(SamplerState::Triggering);
        if self.echo.read()?.is_high() {
            return Err(SensorError::EchoBusy);
        }
        // Subscribe first so the rising edge cannot slip past us.
        let capture = EchoCapture::subscribe(&mut self.echo, self.config.debounce())?;
        self.trigger.emit()?;

        self.shared.set_state(SamplerState::Capturing);
        let measurement = capture.capture(self.config.edge_timeout()).await?;
        trace!(width = ?measurement.pulse_width(), "echo captured");
        Ok(measurement.distance_cm())
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    // A closed channel means the handle is gone, which also stops us.
    let _ = cancel.wait_for(|stop| *stop).await;
}
