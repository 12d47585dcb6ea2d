//! Session Configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use presence_signals::GateThresholds;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Timing and threshold parameters for one verification session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between detection polls (ms).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Overall deadline for the challenge sequence (ms), measured from the
    /// end of provider warmup.
    #[serde(default = "default_overall_timeout_ms")]
    pub overall_timeout_ms: u64,

    /// Delay between reaching the passed state and invoking the completion
    /// callback, so the user sees the success status (ms).
    #[serde(default = "default_success_grace_ms")]
    pub success_grace_ms: u64,

    /// Interval of the warmup progress animation (ms).
    #[serde(default = "default_warmup_tick_ms")]
    pub warmup_tick_ms: u64,

    /// Progress percentage added per warmup tick. Progress is capped at 90
    /// until warmup completes, then forced to 100.
    #[serde(default = "default_warmup_step_percent")]
    pub warmup_step_percent: u8,

    /// Gate thresholds for the three challenges.
    #[serde(default)]
    pub thresholds: GateThresholds,
}

fn default_poll_interval_ms() -> u64 {
    500
}
fn default_overall_timeout_ms() -> u64 {
    60_000
}
fn default_success_grace_ms() -> u64 {
    3_000
}
fn default_warmup_tick_ms() -> u64 {
    200
}
fn default_warmup_step_percent() -> u8 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            overall_timeout_ms: default_overall_timeout_ms(),
            success_grace_ms: default_success_grace_ms(),
            warmup_tick_ms: default_warmup_tick_ms(),
            warmup_step_percent: default_warmup_step_percent(),
            thresholds: GateThresholds::default(),
        }
    }
}

impl SessionConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let cfg: SessionConfig = toml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be positive".into(),
            ));
        }
        if self.overall_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "overall_timeout_ms must be positive".into(),
            ));
        }
        if self.warmup_tick_ms == 0 {
            return Err(ConfigError::Validation(
                "warmup_tick_ms must be positive".into(),
            ));
        }
        if self.warmup_step_percent == 0 || self.warmup_step_percent > 100 {
            return Err(ConfigError::Validation(
                "warmup_step_percent must be in 1..=100".into(),
            ));
        }
        if !self.thresholds.is_valid() {
            return Err(ConfigError::Validation(
                "gate thresholds must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}
