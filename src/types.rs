//! Shared types for BETWATCH.
//!
//! Backend snapshots, the session state machine's states, and the
//! error types used across the backend, screen and engine modules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time read of `/api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub streak: i64,
    pub status: String,
    /// Stamped locally when the response is decoded.
    #[serde(skip_deserializing, default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

/// Result of one `/api/check-new-bet` probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetCheckResult {
    #[serde(rename = "newBet")]
    pub new_bet: bool,
    #[serde(default)]
    pub bet: Option<DetectedBet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBet {
    #[serde(default)]
    pub streak: Option<i64>,
}

impl BetCheckResult {
    /// Streak to show right after a detection.
    ///
    /// Uses the backend's streak when the probe carried one, otherwise the
    /// previously displayed streak plus one. Display only: the next
    /// `fetch_status` is authoritative.
    pub fn display_streak(&self, previous: Option<i64>) -> i64 {
        self.bet
            .as_ref()
            .and_then(|b| b.streak)
            .unwrap_or_else(|| previous.unwrap_or(0).saturating_add(1))
    }
}

/// Read of `/api/user-profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub name: String,
    /// USDT balance.
    pub usdt: Decimal,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: String,
}

impl fmt::Display for ProfileSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {:.2} USDT", self.name, self.usdt)
    }
}

/// Bet identifier as sent by the backend (numeric or textual).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
}

/// One row of `/api/bet-history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(rename = "potentialMultiplier")]
    pub potential_multiplier: Decimal,
    pub status: String,
}

impl HistoryEntry {
    /// Currency symbol, or an empty string when the backend omitted it.
    pub fn symbol(&self) -> &str {
        self.currency.as_ref().map(|c| c.symbol.as_str()).unwrap_or("")
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol();
        if symbol.is_empty() {
            write!(f, "#{} {}", self.id, self.amount)?;
        } else {
            write!(f, "#{} {} {}", self.id, self.amount, symbol)?;
        }
        write!(f, " x{:.2} [{}]", self.potential_multiplier, self.status)
    }
}

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

/// How a detection session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A probe reported a new bet.
    Success { streak: i64 },
    /// The attempt budget ran out.
    Timeout,
    /// A probe failed.
    Error,
    /// Stopped by the user or the host; silent.
    Cancelled,
}

impl Termination {
    pub const TIMEOUT_MESSAGE: &'static str = "Polling timed out. Did you place a bet?";
    pub const PROBE_ERROR_MESSAGE: &'static str = "Error checking for bet.";

    /// Message for the listening display, `None` for a silent termination.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Termination::Timeout => Some(Self::TIMEOUT_MESSAGE),
            Termination::Error => Some(Self::PROBE_ERROR_MESSAGE),
            Termination::Success { .. } | Termination::Cancelled => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Success { streak } => write!(f, "Success (streak {streak})"),
            Termination::Timeout => write!(f, "Timeout"),
            Termination::Error => write!(f, "Error"),
            Termination::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Listening,
    Terminated(Termination),
}

impl SessionState {
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionState::Listening)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }

    pub fn termination(&self) -> Option<Termination> {
        match self {
            SessionState::Terminated(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Terminated(t) => write!(f, "Terminated({t})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A single backend call failed. Always recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Backend returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Probe task for {endpoint} did not complete: {message}")]
    Task { endpoint: String, message: String },
}

impl FetchError {
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Decode { endpoint, .. }
            | FetchError::Task { endpoint, .. } => endpoint,
        }
    }
}

/// Session misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session can only be started from Idle (currently {0})")]
    NotIdle(SessionState),

    #[error("A bet detection session is already listening")]
    AlreadyListening,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
