use std::time::Duration;

use aurus_ultrasonic::DriverConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "AURUS";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub sensor: DriverConfig,
    #[serde(default)]
    pub simulation: SimConfig,
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn default_poll_interval_ms() -> u64 {
    250
}

/// Scene played back by the simulated sensor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub min_distance_cm: f64,
    pub max_distance_cm: f64,
    pub step_cm: f64,
    pub echo_delay_us: u64,
    pub dropout_every: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            min_distance_cm: 20.0,
            max_distance_cm: 200.0,
            step_cm: 15.0,
            echo_delay_us: 450,
            dropout_every: 0,
        }
    }
}

/// Load `config/default.toml`, overridden by `AURUS__SECTION__KEY` variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
