//! Configuration system for courier.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $COURIER_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/courier/config.toml
//!   3. ~/.config/courier/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub delivery: DeliveryConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Webhook endpoint URL. Empty = unset; required before any send.
    pub url: String,
    /// Max characters per message chunk.
    pub max_message_length: usize,
    /// Max file size in bytes before splitting into parts.
    pub max_file_size: u64,
    /// Max concurrent upload workers per batch.
    pub max_workers: usize,
    /// Steady-state outbound request rate.
    pub requests_per_second: f64,
    /// Per-request timeout in seconds. 0 = no timeout.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Include the hostname line in status reports.
    pub include_hostname: bool,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_message_length: 2000,
            max_file_size: 25_165_824, // 24 MiB
            max_workers: 5,
            requests_per_second: 0.2,
            request_timeout_secs: 300,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_hostname: true,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("courier")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl CourierConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            CourierConfig::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, bypassing the default resolution.
    /// The file must exist. Env overrides still apply.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        let mut config: CourierConfig =
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("COURIER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&CourierConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply COURIER_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("COURIER_DELIVERY__URL") {
            self.delivery.url = v;
        }
        if let Ok(v) = std::env::var("COURIER_DELIVERY__MAX_MESSAGE_LENGTH") {
            if let Ok(n) = v.parse() {
                self.delivery.max_message_length = n;
            }
        }
        if let Ok(v) = std::env::var("COURIER_DELIVERY__MAX_FILE_SIZE") {
            if let Ok(n) = v.parse() {
                self.delivery.max_file_size = n;
            }
        }
        if let Ok(v) = std::env::var("COURIER_DELIVERY__MAX_WORKERS") {
            if let Ok(n) = v.parse() {
                self.delivery.max_workers = n;
            }
        }
        if let Ok(v) = std::env::var("COURIER_DELIVERY__REQUESTS_PER_SECOND") {
            if let Ok(r) = v.parse() {
                self.delivery.requests_per_second = r;
            }
        }
        if let Ok(v) = std::env::var("COURIER_DELIVERY__REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.delivery.request_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("COURIER_REPORT__INCLUDE_HOSTNAME") {
            self.report.include_hostname = v == "true" || v == "1";
        }
    }

    /// Reject values that would break the delivery pipeline downstream:
    /// a zero chunk limit stalls the splitter, a zero rate stalls the limiter.
    fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.delivery;
        if d.max_message_length == 0 {
            return Err(ConfigError::Invalid(
                "delivery.max_message_length must be at least 1".into(),
            ));
        }
        if d.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "delivery.max_file_size must be at least 1".into(),
            ));
        }
        if d.max_workers == 0 {
            return Err(ConfigError::Invalid(
                "delivery.max_workers must be at least 1".into(),
            ));
        }
        if !d.requests_per_second.is_finite() || d.requests_per_second <= 0.0 {
            return Err(ConfigError::Invalid(
                "delivery.requests_per_second must be positive".into(),
            ));
        }
        // The limiter turns the rate into an interval of 1/rate seconds;
        // a rate whose reciprocal does not fit a Duration must not reach it.
        if Duration::try_from_secs_f64(1.0 / d.requests_per_second).is_err() {
            return Err(ConfigError::Invalid(
                "delivery.requests_per_second is too small".into(),
            ));
        }
        Ok(())
    }
}
