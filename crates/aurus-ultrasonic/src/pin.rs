//! GPIO abstraction consumed by the driver.
//!
//! Backends provide an output line for the trigger and an input line for the
//! echo that can deliver timestamped edge events. Pin numbering and bus
//! setup belong to the backend.

use core::ops::Not;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::PinError;

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// Line driven or read low.
    #[default]
    Low,
    /// Line driven or read high.
    High,
}

impl Level {
    /// Returns `true` for [`Level::High`].
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Which transitions an edge subscription reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high only.
    Rising,
    /// High to low only.
    Falling,
    /// Both directions.
    Both,
}

impl Edge {
    /// Whether a transition to `level` is reported under this mode.
    pub const fn accepts(self, level: Level) -> bool {
        match self {
            Edge::Rising => level.is_high(),
            Edge::Falling => !level.is_high(),
            Edge::Both => true,
        }
    }
}

/// A transition observed on an input line.
///
/// `level` is the level the line moved to, so a rising edge carries
/// [`Level::High`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Level after the transition.
    pub level: Level,
    /// When the transition happened.
    pub timestamp: Instant,
}

/// Stream of edge events delivered in arrival order.
pub type EdgeReceiver = mpsc::Receiver<EdgeEvent>;

/// Output line that fires the sensor.
pub trait TriggerPin: Send + 'static {
    /// Drive the line to `level`.
    fn write(&mut self, level: Level) -> Result<(), PinError>;
}

/// Input line carrying the echo pulse.
pub trait EchoPin: Send + 'static {
    /// Read the current line level.
    fn read(&mut self) -> Result<Level, PinError>;

    /// Start delivering edge events matching `edge`, at most one per `debounce`.
    ///
    /// Only one subscription is active at a time; subscribing again replaces
    /// the previous stream.
    fn subscribe_edges(&mut self, edge: Edge, debounce: Duration) -> Result<EdgeReceiver, PinError>;

    /// Stop delivering edge events. Calling this without an active
    /// subscription is not an error.
    fn unsubscribe(&mut self) -> Result<(), PinError>;
}
