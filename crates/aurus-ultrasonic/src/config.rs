//! Driver timing settings.

use std::time::Duration;

use serde::Deserialize;

use crate::error::InitError;

const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 500;
const DEFAULT_EDGE_TIMEOUT_MS: u64 = 1000;
const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Timing parameters of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Pause between the end of one cycle and the next trigger.
    pub sample_interval_ms: u64,
    /// How long to wait for each edge of the echo.
    pub edge_timeout_ms: u64,
    /// Minimum spacing of edge notifications, handed to the pin backend.
    pub debounce_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            edge_timeout_ms: DEFAULT_EDGE_TIMEOUT_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl DriverConfig {
    /// [`Self::sample_interval_ms`] as a [`Duration`].
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// [`Self::edge_timeout_ms`] as a [`Duration`].
    pub fn edge_timeout(&self) -> Duration {
        Duration::from_millis(self.edge_timeout_ms)
    }

    /// [`Self::debounce_ms`] as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Reject settings that would spin the sampler or never wait for an echo.
    pub fn validate(&self) -> Result<(), InitError> {
        if self.edge_timeout_ms == 0 {
            return Err(InitError::InvalidConfig("edge_timeout_ms must be positive"));
        }
        if self.sample_interval_ms == 0 {
            return Err(InitError::InvalidConfig("sample_interval_ms must be positive"));
        }
        Ok(())
    }
}
