use std::time::Duration;

use aurus_ultrasonic::sim::{EchoResponse, SimulatedSensor};
use tracing::debug;

use crate::config::SimConfig;

/// A target moving back and forth in front of the simulated sensor.
pub struct Scene {
    config: SimConfig,
    distance_cm: f64,
    direction: f64,
    ticks: u32,
}

impl Scene {
    pub fn new(config: SimConfig) -> Self {
        Self { distance_cm: config.min_distance_cm, direction: 1.0, ticks: 0, config }
    }

    pub fn distance_cm(&self) -> f64 {
        self.distance_cm
    }

    /// Move the target one step and queue the echo for the sensor's next trigger.
    pub fn advance(&mut self, sensor: &SimulatedSensor) {
        self.ticks += 1;
        let (min, max) = (self.config.min_distance_cm, self.config.max_distance_cm);
        let next = self.distance_cm + self.direction * self.config.step_cm;
        if next > max || next < min {
            self.direction = -self.direction;
        }
        self.distance_cm = next.clamp(min, max);

        let delay = Duration::from_micros(self.config.echo_delay_us);
        sensor.set_default(EchoResponse::at_distance(self.distance_cm, delay));
        if self.config.dropout_every > 0 && self.ticks % self.config.dropout_every == 0 {
            debug!(tick = self.ticks, "dropping next echo");
            sensor.push_response(EchoResponse::silent());
        }
    }
}
