mod config; // brings `config.rs` in as `crate::config`
mod scene; // brings `scene.rs` in as `crate::scene`

use aurus_ultrasonic::Hcsr04;
use aurus_ultrasonic::sim::{EchoResponse, SimulatedSensor};
use tokio::time;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

use crate::scene::Scene;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Aurus Sonar started.");
    let app = config::load_config()?;

    let sensor = SimulatedSensor::new(EchoResponse::silent());
    let mut scene = Scene::new(app.simulation.clone());
    scene.advance(&sensor);
    let (trigger, echo) = sensor.pins();

    let driver = Hcsr04::new(trigger, echo, app.sensor)?;
    let mut poll = time::interval(app.poll_interval());
    let mut last_seen = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested.");
                break;
            }
            _ = poll.tick() => {
                let (distance_cm, error) = driver.read_distance_cm();
                if let Some(e) = error {
                    warn!(%e, distance_cm, "Sensor fault");
                } else {
                    info!(distance_cm, target_cm = scene.distance_cm(), state = ?driver.state(), "Reading");
                }
                // Move the target once per completed sample.
                let published = driver.samples_published();
                if published != last_seen {
                    last_seen = published;
                    scene.advance(&sensor);
                }
            }
        }
    }

    driver.close_and_wait().await;
    info!("Aurus Sonar stopped.");
    Ok(())
}
