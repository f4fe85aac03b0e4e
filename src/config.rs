// config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::global_variables::{
    CONFIG_ENV_VAR, PAIRED_CYCLE_PERIOD, RED_DURATION, ROUND_ROBIN_PERIOD, TICK_MILLIS,
    YELLOW_DURATION,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} must be at least one time-unit")]
    ZeroDuration(&'static str),
}

/// Signal timings in logical time-units. Any field left out of a JSON file keeps its
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub yellow_duration: u64,
    pub red_duration: u64,
    pub round_robin_period: u64,
    pub paired_cycle_period: u64,
    /// Wall-clock milliseconds per time-unit in the real-time loop.
    pub tick_millis: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            yellow_duration: YELLOW_DURATION,
            red_duration: RED_DURATION,
            round_robin_period: ROUND_ROBIN_PERIOD,
            paired_cycle_period: PAIRED_CYCLE_PERIOD,
            tick_millis: TICK_MILLIS,
        }
    }
}

impl TimingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TimingConfig = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Loads the file named by `INTERSECTION_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_json_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        let fields = [
            ("yellow_duration", self.yellow_duration),
            ("red_duration", self.red_duration),
            ("round_robin_period", self.round_robin_period),
            ("paired_cycle_period", self.paired_cycle_period),
            ("tick_millis", self.tick_millis),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::ZeroDuration(*name)),
            None => Ok(self),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
