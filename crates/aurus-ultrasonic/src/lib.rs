#![warn(missing_docs)]
#![doc = "Driver for HC-SR04 style ultrasonic rangefinders."]
#![doc = ""]
#![doc = "A trigger pulse starts each measurement, the echo pulse is captured from"]
#![doc = "timestamped edge events, and a background task keeps the latest distance"]
#![doc = "available to readers that never block on it."]
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use aurus_ultrasonic::sim::{EchoResponse, SimulatedSensor};
//! use aurus_ultrasonic::{DriverConfig, Hcsr04};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), aurus_ultrasonic::InitError> {
//! let sensor = SimulatedSensor::new(EchoResponse::at_distance(42.0, Duration::from_micros(400)));
//! let (trigger, echo) = sensor.pins();
//!
//! let driver = Hcsr04::new(trigger, echo, DriverConfig::default())?;
//! tokio::time::sleep(Duration::from_millis(50)).await;
//! let (distance_cm, error) = driver.read_distance_cm();
//! assert!(error.is_none());
//! assert!((distance_cm - 42.0).abs() < 0.01);
//!
//! driver.close_and_wait().await;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod distance;
pub mod driver;
pub mod error;
pub mod pin;
pub mod sample;
pub mod sampler;
pub mod sim;
pub mod trigger;

pub use capture::{EchoCapture, Measurement, measure_once};
pub use config::DriverConfig;
pub use distance::{SPEED_OF_SOUND_CM_PER_S, pulse_to_distance_cm, to_distance_cm};
pub use driver::Hcsr04;
pub use error::{EchoPhase, InitError, PinError, SensorError};
pub use pin::{EchoPin, Edge, EdgeEvent, EdgeReceiver, Level, TriggerPin};
pub use sample::{Sample, SampleSlot};
pub use sampler::SamplerState;
pub use trigger::{TRIGGER_PULSE, TriggerEmitter, emit_trigger};
