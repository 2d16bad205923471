//! Software HC-SR04 for running the driver without hardware.
//!
//! [`SimulatedSensor`] hands out a trigger pin and an echo pin that share one
//! simulated line. When the trigger falls after being high, the next scripted
//! [`EchoResponse`] is turned into edge events, timestamped relative to the
//! trigger, and delivered to the active echo subscription. Faults can be
//! injected to exercise the error paths.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{trace, warn};

use crate::distance::SPEED_OF_SOUND_CM_PER_S;
use crate::error::PinError;
use crate::pin::{EchoPin, Edge, EdgeEvent, EdgeReceiver, Level, TriggerPin};

const EVENT_QUEUE_DEPTH: usize = 32;

/// Edges the simulated sensor produces for one trigger, as `(level, offset
/// from the trigger)` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EchoResponse {
    edges: Vec<(Level, Duration)>,
}

impl EchoResponse {
    /// Arbitrary edges, delivered in the given order.
    pub fn edges(edges: Vec<(Level, Duration)>) -> Self {
        Self { edges }
    }

    /// A clean echo: high after `delay`, low `width` later.
    pub fn pulse(delay: Duration, width: Duration) -> Self {
        Self::edges(vec![(Level::High, delay), (Level::Low, delay + width)])
    }

    /// The echo a target at `distance_cm` would produce.
    pub fn at_distance(distance_cm: f64, delay: Duration) -> Self {
        let width = Duration::from_secs_f64((2.0 * distance_cm / SPEED_OF_SOUND_CM_PER_S).max(0.0));
        Self::pulse(delay, width)
    }

    /// A pulse whose edges are each reported twice, one microsecond apart.
    pub fn bouncy(delay: Duration, width: Duration) -> Self {
        let bounce = Duration::from_micros(1);
        Self::edges(vec![
            (Level::High, delay),
            (Level::High, delay + bounce),
            (Level::Low, delay + width),
            (Level::Low, delay + width + bounce),
        ])
    }

    /// No echo at all.
    pub fn silent() -> Self {
        Self::default()
    }
}

/// Counters kept by the simulated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimStats {
    /// Completed trigger pulses.
    pub triggers: u64,
    /// Edge subscriptions opened.
    pub subscriptions: u64,
    /// Active subscriptions released.
    pub unsubscriptions: u64,
}

#[derive(Debug, Default)]
struct Faults {
    writes: bool,
    reads: bool,
    subscribe: bool,
}

#[derive(Debug, Default)]
struct Line {
    default: EchoResponse,
    script: VecDeque<EchoResponse>,
    trigger_level: Level,
    echo_level: Level,
    subscriber: Option<(Edge, mpsc::Sender<EdgeEvent>)>,
    debounce: Duration,
    faults: Faults,
    stats: SimStats,
}

impl Line {
    fn fire(&mut self) {
        self.stats.triggers += 1;
        let response = self.script.pop_front().unwrap_or_else(|| self.default.clone());
        let Some((edge, tx)) = &self.subscriber else {
            trace!("trigger fired with nobody listening");
            return;
        };
        let fired_at = Instant::now();
        for (level, offset) in response.edges {
            if !edge.accepts(level) {
                continue;
            }
            let event = EdgeEvent { level, timestamp: fired_at + offset };
            if let Err(e) = tx.try_send(event) {
                warn!(error = %e, "dropping simulated edge");
            }
        }
    }
}

/// Controller for a simulated sensor.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSensor {
    line: Arc<Mutex<Line>>,
}

impl SimulatedSensor {
    /// A sensor answering every trigger with `default` unless a scripted
    /// response is queued.
    pub fn new(default: EchoResponse) -> Self {
        let line = Line { default, ..Default::default() };
        Self { line: Arc::new(Mutex::new(line)) }
    }

    /// Trigger and echo pins wired to this sensor.
    pub fn pins(&self) -> (SimTrigger, SimEcho) {
        (SimTrigger { line: self.line.clone() }, SimEcho { line: self.line.clone() })
    }

    /// Queue a response for the next trigger.
    pub fn push_response(&self, response: EchoResponse) {
        self.line.lock().script.push_back(response);
    }

    /// Response used when the script is empty.
    pub fn set_default(&self, response: EchoResponse) {
        self.line.lock().default = response;
    }

    /// Level returned by reads of the echo line.
    pub fn set_echo_level(&self, level: Level) {
        self.line.lock().echo_level = level;
    }

    /// Make trigger writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.line.lock().faults.writes = fail;
    }

    /// Make echo reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.line.lock().faults.reads = fail;
    }

    /// Make edge subscriptions fail.
    pub fn fail_subscribe(&self, fail: bool) {
        self.line.lock().faults.subscribe = fail;
    }

    /// Counters so far.
    pub fn stats(&self) -> SimStats {
        self.line.lock().stats
    }

    /// Whether an echo subscription is active.
    pub fn is_subscribed(&self) -> bool {
        self.line.lock().subscriber.is_some()
    }

    /// Debounce requested by the most recent subscription. The simulated
    /// line is noise free, so it is recorded but not applied.
    pub fn debounce(&self) -> Duration {
        self.line.lock().debounce
    }
}

/// Trigger side of a [`SimulatedSensor`].
#[derive(Debug)]
pub struct SimTrigger {
    line: Arc<Mutex<Line>>,
}

impl TriggerPin for SimTrigger {
    fn write(&mut self, level: Level) -> Result<(), PinError> {
        let mut line = self.line.lock();
        if line.faults.writes {
            return Err(PinError::Write("simulated write fault".into()));
        }
        let previous = std::mem::replace(&mut line.trigger_level, level);
        if previous == Level::High && level == Level::Low {
            line.fire();
        }
        Ok(())
    }
}

/// Echo side of a [`SimulatedSensor`].
#[derive(Debug)]
pub struct SimEcho {
    line: Arc<Mutex<Line>>,
}

impl EchoPin for SimEcho {
    fn read(&mut self) -> Result<Level, PinError> {
        let line = self.line.lock();
        if line.faults.reads {
            return Err(PinError::Read("simulated read fault".into()));
        }
        Ok(line.echo_level)
    }

    fn subscribe_edges(&mut self, edge: Edge, debounce: Duration) -> Result<EdgeReceiver, PinError> {
        let mut line = self.line.lock();
        if line.faults.subscribe {
            return Err(PinError::Subscribe("simulated subscribe fault".into()));
        }
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        line.subscriber = Some((edge, tx));
        line.debounce = debounce;
        line.stats.subscriptions += 1;
        Ok(rx)
    }

    fn unsubscribe(&mut self) -> Result<(), PinError> {
        let mut line = self.line.lock();
        if line.subscriber.take().is_some() {
            line.stats.unsubscriptions += 1;
        }
        Ok(())
    }
}
