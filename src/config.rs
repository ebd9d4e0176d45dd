//! Run timing configuration
//!
//! Values come from, in increasing precedence:
//! - built-in defaults
//! - a YAML file (`default_timeout_ms`, `poll_interval_ms`)
//! - `APPTEST_TIMEOUT_MS` / `APPTEST_POLL_INTERVAL_MS`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppTestError, Result};

/// Default per-run timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// How often a running script is checked for completion
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const TIMEOUT_ENV: &str = "APPTEST_TIMEOUT_MS";
pub const POLL_INTERVAL_ENV: &str = "APPTEST_POLL_INTERVAL_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppTestConfig {
    /// Used when a run is requested without an explicit timeout
    #[serde(rename = "default_timeout_ms", with = "millis")]
    pub default_timeout: Duration,

    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl Default for AppTestConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl AppTestConfig {
    /// Short timings for fast-running scripts
    pub fn testing() -> Self {
        Self {
            default_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(5),
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?.with_env_overrides()?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(ms) = env_millis(TIMEOUT_ENV)? {
            self.default_timeout = ms;
        }
        if let Some(ms) = env_millis(POLL_INTERVAL_ENV)? {
            self.poll_interval = ms;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_timeout.is_zero() {
            return Err(AppTestError::Config {
                reason: "default_timeout_ms must be greater than 0".into(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(AppTestError::Config {
                reason: "poll_interval_ms must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| AppTestError::Config {
                reason: format!("{name}={raw:?}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppTestConfig::default();
        assert_eq!(config.default_timeout, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppTestConfig::from_yaml_str("default_timeout_ms: 500\n").unwrap();
        assert_eq!(config.default_timeout, Duration::from_millis(500));
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_zero_values_rejected() {
        let err = AppTestConfig::from_yaml_str("poll_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, AppTestError::Config { .. }));
        assert_eq!(err.code(), "APPTEST-040");
    }

    #[test]
    fn test_serializes_as_millis() {
        let yaml = serde_yaml::to_string(&AppTestConfig::testing()).unwrap();
        assert!(yaml.contains("default_timeout_ms: 1000"));
        assert!(yaml.contains("poll_interval_ms: 5"));
    }
}
