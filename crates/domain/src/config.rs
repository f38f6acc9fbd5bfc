//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_NOTICE_DURATION_MS, DEFAULT_SYNC_INTERVAL_SECS, DEFAULT_TIMEZONE,
    DEFAULT_TRANSITION_DELAY_MS,
};
use crate::{Result, WayfareError};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collector: CollectorConfig,
    pub sync: SyncConfig,
    pub layout: LayoutConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values that would make the runtime misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.collector.base_url.trim().is_empty() {
            return Err(WayfareError::Config("collector.base_url must not be empty".into()));
        }
        if self.collector.timeout_seconds == 0 {
            return Err(WayfareError::Config("collector.timeout_seconds must be positive".into()));
        }
        if self.sync.interval_seconds == 0 {
            return Err(WayfareError::Config("sync.interval_seconds must be positive".into()));
        }
        if self.sync.request_timeout_seconds == 0 {
            return Err(WayfareError::Config(
                "sync.request_timeout_seconds must be positive".into(),
            ));
        }
        if self.analysis.default_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(WayfareError::Config(format!(
                "analysis.default_timezone is not a known IANA zone: {}",
                self.analysis.default_timezone
            )));
        }
        Ok(())
    }
}

/// Remote behavior collector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Total attempts per request; 1 disables immediate retries
    pub max_attempts: usize,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_seconds: 10,
            max_attempts: 1,
            auth_token: None,
        }
    }
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Periodic synchronization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub interval_seconds: u64,
    pub enabled: bool,
    pub request_timeout_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { interval_seconds: DEFAULT_SYNC_INTERVAL_SECS, enabled: true, request_timeout_seconds: 15 }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Layout adapter timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub transition_delay_ms: u64,
    pub notice_duration_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            transition_delay_ms: DEFAULT_TRANSITION_DELAY_MS,
            notice_duration_ms: DEFAULT_NOTICE_DURATION_MS,
        }
    }
}

impl LayoutConfig {
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

/// Pattern analysis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Zone used when a user's preferred timezone is not a known IANA name
    pub default_timezone: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { default_timezone: DEFAULT_TIMEZONE.to_string() }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.interval(), Duration::from_secs(30));
        assert_eq!(config.layout.transition_delay(), Duration::from_millis(300));
        assert_eq!(config.layout.notice_duration(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut config = Config::default();
        config.sync.interval_seconds = 0;
        assert!(matches!(config.validate(), Err(WayfareError::Config(_))));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut config = Config::default();
        config.analysis.default_timezone = "Mars/Olympus".into();
        assert!(matches!(config.validate(), Err(WayfareError::Config(_))));
    }

    #[test]
    fn auth_token_is_never_serialized() {
        let mut config = Config::default();
        config.collector.auth_token = Some("secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
