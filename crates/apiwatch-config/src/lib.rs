//! Configuration for the apiwatch dashboard: defaults, an optional TOML
//! file, `APIWATCH_*` environment variables, and command-line overrides,
//! in increasing order of precedence.
//!
//! Core never sees these types; it receives a pre-built
//! [`DashboardConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use apiwatch_core::{DashboardConfig, TlsMode};

/// Longest base URL accepted.
const MAX_URL_LEN: usize = 2048;

/// Service address used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8001";

/// Prefix for environment overrides (`APIWATCH_API_BASE`, ...).
pub const ENV_PREFIX: &str = "APIWATCH_";

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Figment(Box<figment::Error>),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Monitoring service root.
    pub api_base: String,
    /// Seconds between background refreshes.
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Log entries shown for the selected endpoint.
    pub log_limit: u32,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            poll_interval_secs: 5,
            timeout_secs: 10,
            log_limit: 200,
            insecure: false,
        }
    }
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_limit: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub insecure: bool,
}

impl Config {
    /// Check ranges and parse the base URL.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let api_base = parse_api_base(&self.api_base)?;
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_secs",
                reason: "must be at least 1".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        if self.log_limit == 0 {
            return Err(ConfigError::Validation {
                field: "log_limit",
                reason: "must be at least 1".into(),
            });
        }
        Ok(api_base)
    }

    /// Translate into the core's runtime settings.
    ///
    /// This is the single boundary where config types cross into core types.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let api_base = self.validate()?;
        Ok(DashboardConfig {
            api_base,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            log_limit: self.log_limit,
            tls: if self.insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: String| ConfigError::Validation {
        field: "api_base",
        reason,
    };

    if raw.len() > MAX_URL_LEN {
        return Err(invalid(format!("longer than {MAX_URL_LEN} characters")));
    }
    let url = Url::parse(raw).map_err(|e| invalid(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("{raw}: scheme must be http or https")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(format!("{raw}: missing host")));
    }
    Ok(url)
}

// ── Loading ──────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "apiwatch", "apiwatch").map_or_else(
        || PathBuf::from(".apiwatch.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Load from the default config path, environment, and `overrides`.
pub fn load_config(overrides: &Overrides) -> Result<Config, ConfigError> {
    load_config_from(&config_path(), overrides)
}

/// Load with an explicit config file. A missing file is not an error.
pub fn load_config_from(path: &Path, overrides: &Overrides) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides))
        .extract()?;
    config.validate()?;
    Ok(config)
}
