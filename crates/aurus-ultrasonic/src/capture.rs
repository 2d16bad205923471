//! Echo pulse capture from edge events.
//!
//! The subscription is opened before the trigger fires so the rising edge
//! cannot be missed, and it is released when the [`EchoCapture`] is dropped,
//! whichever way the capture ends.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{trace, warn};

use crate::distance;
use crate::error::{EchoPhase, PinError, SensorError};
use crate::pin::{EchoPin, Edge, EdgeReceiver, Level, TriggerPin};
use crate::trigger::emit_trigger;

/// One completed trigger/echo cycle. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    start: Instant,
    end: Instant,
}

impl Measurement {
    /// Builds a measurement, rejecting pulses that end before they start.
    pub fn new(start: Instant, end: Instant) -> Result<Self, SensorError> {
        if end < start {
            return Err(SensorError::InvalidPulse);
        }
        Ok(Self { start, end })
    }

    /// Timestamp of the rising edge.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Timestamp of the falling edge.
    pub fn end(&self) -> Instant {
        self.end
    }

    /// Time the echo line stayed high.
    pub fn pulse_width(&self) -> Duration {
        self.end - self.start
    }

    /// Distance to the target in centimeters.
    pub fn distance_cm(&self) -> f64 {
        distance::to_distance_cm(self.start, self.end)
    }
}

/// An active edge subscription on the echo line.
pub struct EchoCapture<'a, E: EchoPin> {
    pin: &'a mut E,
    events: EdgeReceiver,
}

impl<'a, E: EchoPin> EchoCapture<'a, E> {
    /// Subscribe to both edges of the echo line.
    pub fn subscribe(pin: &'a mut E, debounce: Duration) -> Result<Self, PinError> {
        let events = pin.subscribe_edges(Edge::Both, debounce)?;
        trace!("echo subscription opened");
        Ok(Self { pin, events })
    }

    /// Wait for the rising then falling edge of the echo.
    ///
    /// Each edge gets its own `timeout` window. Edges that repeat the level
    /// already seen are treated as noise and skipped without extending the
    /// window.
    pub async fn capture(mut self, timeout: Duration) -> Result<Measurement, SensorError> {
        let start = self.next_edge(Level::High, EchoPhase::Start, timeout).await?;
        let end = self.next_edge(Level::Low, EchoPhase::End, timeout).await?;
        Measurement::new(start, end)
    }

    async fn next_edge(
        &mut self,
        level: Level,
        phase: EchoPhase,
        timeout: Duration,
    ) -> Result<Instant, SensorError> {
        let deadline = Instant::now() + timeout;
        loop {
            match time::timeout_at(deadline, self.events.recv()).await {
                Err(_) => return Err(SensorError::Timeout(phase)),
                Ok(None) => {
                    return Err(PinError::Subscribe("edge stream closed".into()).into());
                }
                Ok(Some(event)) if event.level == level => return Ok(event.timestamp),
                Ok(Some(event)) => trace!(?event, %phase, "skipping edge at unexpected level"),
            }
        }
    }
}

impl<E: EchoPin> Drop for EchoCapture<'_, E> {
    fn drop(&mut self) {
        match self.pin.unsubscribe() {
            Ok(()) => trace!("echo subscription released"),
            Err(e) => warn!(error = %e, "failed to release echo subscription"),
        }
    }
}

/// Run a single trigger/echo cycle without the background sampler.
pub async fn measure_once<T, E>(
    trigger: &mut T,
    echo: &mut E,
    debounce: Duration,
    timeout: Duration,
) -> Result<Measurement, SensorError>
where
    T: TriggerPin,
    E: EchoPin,
{
    if echo.read()?.is_high() {
        return Err(SensorError::EchoBusy);
    }
    let capture = EchoCapture::subscribe(echo, debounce)?;
    emit_trigger(trigger)?;
    capture.capture(timeout).await
}
