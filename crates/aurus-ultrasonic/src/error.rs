//! Error types for the ultrasonic driver.
//!
//! Pin failures come from the GPIO backend, sensor errors are what a
//! measurement cycle publishes, and init errors are returned synchronously
//! from driver construction.

use thiserror::Error;

/// Failure reported by a GPIO backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    /// Reading the line level failed.
    #[error("pin read failed: {0}")]
    Read(String),
    /// Driving the line failed.
    #[error("pin write failed: {0}")]
    Write(String),
    /// Registering for edge notifications failed, or the event stream closed.
    #[error("edge subscription failed: {0}")]
    Subscribe(String),
    /// Clearing an edge registration failed.
    #[error("edge unsubscription failed: {0}")]
    Unsubscribe(String),
}

/// Which edge of the echo pulse a capture was waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoPhase {
    /// Waiting for the rising edge that starts the echo.
    Start,
    /// Waiting for the falling edge that ends the echo.
    End,
}

impl core::fmt::Display for EchoPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EchoPhase::Start => write!(f, "echo start"),
            EchoPhase::End => write!(f, "echo end"),
        }
    }
}

/// Error recorded for a single measurement cycle.
///
/// None of these stop the background sampler; they are published alongside
/// the last good distance and surfaced once to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Hardware access failed while triggering or capturing.
    #[error(transparent)]
    Pin(#[from] PinError),
    /// No qualifying edge arrived within the edge timeout.
    #[error("timed out waiting for {0}")]
    Timeout(EchoPhase),
    /// The captured pulse ended before it started.
    #[error("invalid echo pulse")]
    InvalidPulse,
    /// The echo line was already high before the trigger was sent.
    #[error("echo line high before trigger")]
    EchoBusy,
}

/// Error returned when the driver cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// A pin could not be prepared.
    #[error("failed to prepare pins: {0}")]
    Pin(#[from] PinError),
    /// The configuration cannot drive a sampler.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Construction happened outside a tokio runtime.
    #[error("no tokio runtime available to run the sampler")]
    NoRuntime,
}
