//! Configuration loading from TOML with environment overrides.
//!
//! Reads `config.toml` into strongly-typed structs. Every field has a
//! default, so a missing section falls back to the built-in values. The
//! backend base URL is the only environment-dependent setting and can be
//! overridden with `BETWATCH_API_URL`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::backend::http::DEFAULT_TIMEOUT;
use crate::engine::session::{
    PollPolicy, DEFAULT_BETTING_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};

/// Environment variable that overrides `backend.base_url`.
pub const API_URL_ENV: &str = "BETWATCH_API_URL";

pub const DEFAULT_BASE_URL: &str = "https://stake-backend-ruwf.onrender.com/";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
    pub betting_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            betting_url: DEFAULT_BETTING_URL.to_string(),
        }
    }
}

impl From<&SessionConfig> for PollPolicy {
    fn from(cfg: &SessionConfig) -> Self {
        PollPolicy {
            interval: Duration::from_secs(cfg.poll_interval_secs),
            max_attempts: cfg.max_attempts,
            betting_url: cfg.betting_url.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load `path` if it exists, otherwise use defaults. Applies env overrides.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_api_url(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Replace the base URL when an override is present and non-empty.
    pub fn apply_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            anyhow::bail!("backend.base_url must not be empty");
        }
        if self.session.poll_interval_secs == 0 {
            anyhow::bail!("session.poll_interval_secs must be at least 1");
        }
        if self.session.max_attempts == 0 {
            anyhow::bail!("session.max_attempts must be at least 1");
        }
        if self.backend.request_timeout_secs == 0 {
            anyhow::bail!("backend.request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.session)
    }
}
