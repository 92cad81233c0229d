//! HTTP client for the betting backend.
//!
//! All endpoints are plain `GET`s returning JSON, relative to a
//! configured base URL. No authentication.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{
    BetProbe, StatusReader, CHECK_NEW_BET_PATH, HISTORY_PATH, PROFILE_PATH, STATUS_PATH,
};
use crate::types::{BetCheckResult, FetchError, HistoryEntry, ProfileSnapshot, StatusSnapshot};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// reqwest-backed implementation of `StatusReader` and `BetProbe`.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `base_url`. A trailing slash is tolerated.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("BETWATCH/0.1.0 (bet-detection-client)")
            .build()
            .context("Failed to build HTTP client for betting backend")?;

        Ok(Self::with_client(base_url, http))
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One GET, decoded as JSON.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path);
        debug!(url = %url, "Fetching from backend");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                endpoint: path.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<T>().await.map_err(|e| FetchError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl StatusReader for HttpBackend {
    async fn fetch_status(&self) -> Result<StatusSnapshot, FetchError> {
        self.get_json(STATUS_PATH).await
    }

    async fn fetch_profile(&self) -> Result<ProfileSnapshot, FetchError> {
        self.get_json(PROFILE_PATH).await
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        let entries: Vec<HistoryEntry> = self.get_json(HISTORY_PATH).await?;
        debug!(count = entries.len(), "Bet history fetched");
        Ok(entries)
    }
}

#[async_trait]
impl BetProbe for HttpBackend {
    async fn check_for_new_bet(&self) -> Result<BetCheckResult, FetchError> {
        self.get_json(CHECK_NEW_BET_PATH).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
