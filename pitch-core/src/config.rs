//! # Configuration Module
//!
//! Tunable parameters for capture, detection and history, with JSON
//! load and save. Every field has a default, so a config file only needs
//! to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::ConfigError;

/// Parameters of the autocorrelation pitch estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// First lag searched. Excludes the zero-lag peak and very high pitches.
    pub min_lag: usize,
    /// Absolute (unnormalized) correlation the winning lag must exceed.
    pub correlation_threshold: f32,
    /// Lowest accepted frequency in Hz.
    pub min_frequency: f32,
    /// Highest accepted frequency in Hz.
    pub max_frequency: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_lag: 50,
            correlation_threshold: 0.1,
            min_frequency: 85.0,
            max_frequency: 750.0,
        }
    }
}

/// Top-level configuration for a tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Number of samples handed to the estimator per tick.
    pub frame_size: usize,
    /// Sample rate requested from the input device when it supports it.
    pub preferred_sample_rate: u32,
    /// Length of the rolling pitch history in seconds.
    pub history_window_secs: f64,
    pub estimator: EstimatorConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frame_size: 4096,
            preferred_sample_rate: 44100,
            history_window_secs: 15.0,
            estimator: EstimatorConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        let config: TrackerConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }

    /// Rejects values the estimator or history cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let est = &self.estimator;
        if self.frame_size < 2 * est.min_lag + 2 {
            return Err(ConfigError::Invalid {
                field: "frame_size",
                msg: format!(
                    "{} is too small for a minimum lag of {}",
                    self.frame_size, est.min_lag
                ),
            });
        }
        if self.preferred_sample_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "preferred_sample_rate",
                msg: "must be positive".into(),
            });
        }
        if !(self.history_window_secs.is_finite() && self.history_window_secs > 0.0) {
            return Err(ConfigError::Invalid {
                field: "history_window_secs",
                msg: format!("{} is not a positive duration", self.history_window_secs),
            });
        }
        if est.min_lag == 0 {
            return Err(ConfigError::Invalid {
                field: "estimator.min_lag",
                msg: "must be at least 1".into(),
            });
        }
        if !(est.correlation_threshold.is_finite() && est.correlation_threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "estimator.correlation_threshold",
                msg: format!("{} is not a non-negative number", est.correlation_threshold),
            });
        }
        if !(est.min_frequency > 0.0 && est.min_frequency < est.max_frequency) {
            return Err(ConfigError::Invalid {
                field: "estimator.min_frequency",
                msg: format!(
                    "band [{}, {}] Hz is empty",
                    est.min_frequency, est.max_frequency
                ),
            });
        }
        Ok(())
    }
}
