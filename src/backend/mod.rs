//! Backend integration.
//!
//! Defines the `StatusReader` and `BetProbe` traits consumed by the
//! engine, and the reqwest-backed `HttpBackend` that implements both
//! against the betting backend's JSON API.

pub mod http;

use async_trait::async_trait;

use crate::types::{BetCheckResult, FetchError, HistoryEntry, ProfileSnapshot, StatusSnapshot};

pub const STATUS_PATH: &str = "/api/status";
pub const CHECK_NEW_BET_PATH: &str = "/api/check-new-bet";
pub const PROFILE_PATH: &str = "/api/user-profile";
pub const HISTORY_PATH: &str = "/api/bet-history";

/// Point-in-time reads of backend state.
///
/// Every call is a single attempt. Retry policy, if any, belongs to the
/// caller.
#[async_trait]
pub trait StatusReader: Send + Sync {
    /// Current streak and textual status.
    async fn fetch_status(&self) -> Result<StatusSnapshot, FetchError>;

    /// Profile (name, balance, avatar).
    async fn fetch_profile(&self) -> Result<ProfileSnapshot, FetchError>;

    /// Bet history in backend order. An empty list is a valid result.
    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, FetchError>;
}

/// The poll probe used by a detection session.
#[async_trait]
pub trait BetProbe: Send + Sync {
    /// Ask the backend whether a new bet appeared.
    async fn check_for_new_bet(&self) -> Result<BetCheckResult, FetchError>;
}

/// Everything a betting session talks to.
pub trait Backend: StatusReader + BetProbe {}

impl<T: StatusReader + BetProbe + ?Sized> Backend for T {}
