//! Display model.
//!
//! `Screen` is what the user sees: streak, bet status, the place-bet
//! button, the listening banner, and the profile and history panels.
//! Engine code mutates it; the binary renders it as text. Fetch failures
//! never propagate past this module, they become static messages.

use std::fmt;
use tracing::{debug, warn};

use crate::backend::StatusReader;
use crate::types::{FetchError, HistoryEntry, ProfileSnapshot, StatusSnapshot};

pub const STATUS_UNAVAILABLE: &str = "Could not connect to server.";
pub const PROFILE_UNAVAILABLE: &str = "Could not load balance.";
pub const HISTORY_UNAVAILABLE: &str = "Could not load bet history.";
pub const HISTORY_EMPTY: &str = "No bets placed yet.";
pub const LISTENING_MESSAGE: &str = "Listening for your bet...";

/// The listening banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listening {
    Hidden,
    Visible(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfilePanel {
    NotLoaded,
    Loaded(ProfileSnapshot),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryPanel {
    NotLoaded,
    Empty,
    Entries(Vec<HistoryEntry>),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    streak: String,
    bet_status: String,
    place_bet_enabled: bool,
    listening: Listening,
    profile: ProfilePanel,
    history: HistoryPanel,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            streak: "0".to_string(),
            bet_status: String::new(),
            place_bet_enabled: true,
            listening: Listening::Hidden,
            profile: ProfilePanel::NotLoaded,
            history: HistoryPanel::NotLoaded,
        }
    }
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors -------------------------------------------------------

    pub fn streak_text(&self) -> &str {
        &self.streak
    }

    pub fn bet_status(&self) -> &str {
        &self.bet_status
    }

    pub fn place_bet_enabled(&self) -> bool {
        self.place_bet_enabled
    }

    pub fn listening(&self) -> &Listening {
        &self.listening
    }

    pub fn profile(&self) -> &ProfilePanel {
        &self.profile
    }

    pub fn history(&self) -> &HistoryPanel {
        &self.history
    }

    /// The streak currently shown, if it is a number.
    pub fn displayed_streak(&self) -> Option<i64> {
        self.streak.trim().parse().ok()
    }

    // -- Status ----------------------------------------------------------

    pub fn set_streak(&mut self, streak: i64) {
        self.streak = streak.to_string();
    }

    pub fn apply_status(&mut self, result: Result<StatusSnapshot, FetchError>) {
        match result {
            Ok(snapshot) => {
                debug!(streak = snapshot.streak, status = %snapshot.status, "Status updated");
                self.streak = snapshot.streak.to_string();
                self.bet_status = snapshot.status;
            }
            Err(e) => {
                warn!(error = %e, "Status fetch failed");
                self.bet_status = STATUS_UNAVAILABLE.to_string();
            }
        }
    }

    // -- Listening banner ------------------------------------------------

    /// Disable place-bet and show the listening banner.
    pub fn begin_listening(&mut self) {
        self.place_bet_enabled = false;
        self.listening = Listening::Visible(LISTENING_MESSAGE.to_string());
    }

    /// Re-enable place-bet. `None` hides the banner, `Some` replaces its text.
    pub fn end_listening(&mut self, message: Option<&str>) {
        self.place_bet_enabled = true;
        self.listening = match message {
            Some(text) => Listening::Visible(text.to_string()),
            None => Listening::Hidden,
        };
    }

    // -- Profile / history -----------------------------------------------

    pub fn apply_profile(&mut self, result: Result<ProfileSnapshot, FetchError>) {
        self.profile = match result {
            Ok(profile) => ProfilePanel::Loaded(profile),
            Err(e) => {
                warn!(error = %e, "Profile fetch failed");
                ProfilePanel::Failed
            }
        };
    }

    pub fn apply_history(&mut self, result: Result<Vec<HistoryEntry>, FetchError>) {
        self.history = match result {
            Ok(entries) if entries.is_empty() => HistoryPanel::Empty,
            Ok(entries) => HistoryPanel::Entries(entries),
            Err(e) => {
                warn!(error = %e, "History fetch failed");
                HistoryPanel::Failed
            }
        };
    }

    /// Profile panel as one line, `None` before the first load.
    pub fn profile_line(&self) -> Option<String> {
        match &self.profile {
            ProfilePanel::NotLoaded => None,
            ProfilePanel::Loaded(p) => Some(p.to_string()),
            ProfilePanel::Failed => Some(PROFILE_UNAVAILABLE.to_string()),
        }
    }

    /// History panel as display lines, in backend order.
    pub fn history_lines(&self) -> Vec<String> {
        match &self.history {
            HistoryPanel::NotLoaded => Vec::new(),
            HistoryPanel::Empty => vec![HISTORY_EMPTY.to_string()],
            HistoryPanel::Entries(entries) => entries.iter().map(|e| e.to_string()).collect(),
            HistoryPanel::Failed => vec![HISTORY_UNAVAILABLE.to_string()],
        }
    }

    /// Multi-line text rendering.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Streak: {}", self.streak)?;
        writeln!(f, "Status: {}", self.bet_status)?;
        if let Listening::Visible(text) = &self.listening {
            writeln!(f, "{text}")?;
        }
        writeln!(
            f,
            "[Place bet] {}",
            if self.place_bet_enabled { "ready" } else { "disabled" }
        )?;
        if let Some(line) = self.profile_line() {
            writeln!(f, "Profile: {line}")?;
        }
        let history = self.history_lines();
        if !history.is_empty() {
            writeln!(f, "History:")?;
            for line in history {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// One-shot loads
// ---------------------------------------------------------------------------

/// Fetch `/api/status` once and apply it.
pub async fn refresh_status<R: StatusReader + ?Sized>(reader: &R, screen: &mut Screen) {
    let result = reader.fetch_status().await;
    screen.apply_status(result);
}

/// Fetch the profile once and apply it. Failures stay in the panel.
pub async fn load_profile<R: StatusReader + ?Sized>(reader: &R, screen: &mut Screen) {
    let result = reader.fetch_profile().await;
    screen.apply_profile(result);
}

/// Fetch the history once and apply it. Failures stay in the panel.
pub async fn load_history<R: StatusReader + ?Sized>(reader: &R, screen: &mut Screen) {
    let result = reader.fetch_history().await;
    screen.apply_history(result);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
