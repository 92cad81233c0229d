//! Bet detection session, the bounded polling state machine.
//!
//! `Idle → Listening → Terminated{Success | Timeout | Error | Cancelled}`.
//!
//! A session owns its `PollTimer` for exactly as long as it is
//! `Listening`; every termination path drops it. Ticks are serialized:
//! the next tick is not awaited until the current tick's probe has
//! resolved, so probe results are observed in tick order and at most one
//! probe is ever in flight. A session is single-use; build a new one to
//! listen again.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::timer::PollTimer;
use crate::backend::{Backend, BetProbe, CHECK_NEW_BET_PATH};
use crate::host::{bet_detected_alert, HostPlatform};
use crate::screen::{refresh_status, Screen};
use crate::types::{BetCheckResult, FetchError, SessionError, SessionState, Termination};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_BETTING_URL: &str = "https://stake.com/sports/soccer";

// ---------------------------------------------------------------------------
// Policy and report
// ---------------------------------------------------------------------------

/// Timing and budget for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Page opened on the host when the session starts.
    pub betting_url: String,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            betting_url: DEFAULT_BETTING_URL.to_string(),
        }
    }
}

/// Summary of a session, for logging and the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub termination: Option<Termination>,
    pub attempts: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionReport {
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.ended_at? - self.started_at?)
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self
            .termination
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Not terminated".to_string());
        write!(f, "Session {}: {} after {} attempt(s)", self.session_id, outcome, self.attempts)?;
        if let Some(d) = self.duration() {
            write!(f, " in {}s", d.num_seconds())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct BetDetectionSession {
    id: Uuid,
    backend: Arc<dyn Backend>,
    host: Arc<dyn HostPlatform>,
    policy: PollPolicy,
    state: SessionState,
    attempt_count: u32,
    /// `Some` iff `state` is `Listening`.
    timer: Option<PollTimer>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl BetDetectionSession {
    pub fn new(backend: Arc<dyn Backend>, host: Arc<dyn HostPlatform>, policy: PollPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend,
            host,
            policy,
            state: SessionState::Idle,
            attempt_count: 0,
            timer: None,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Whether the poll timer is currently held.
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Open the betting site, arm the timer and show the listening banner.
    ///
    /// Only valid from `Idle`. The site is opened before the timer is armed.
    pub fn start(&mut self, screen: &mut Screen) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::NotIdle(self.state));
        }

        self.host.open_external_surface(&self.policy.betting_url);

        self.state = SessionState::Listening;
        self.attempt_count = 0;
        self.started_at = Some(Utc::now());
        self.timer = Some(PollTimer::arm(self.policy.interval));
        screen.begin_listening();

        info!(
            session_id = %self.id,
            interval_secs = self.policy.interval.as_secs(),
            max_attempts = self.policy.max_attempts,
            "Listening for new bet"
        );
        Ok(())
    }

    /// Drive ticks until the session terminates.
    ///
    /// Firing `cancel` terminates silently with `Cancelled`. A probe that is
    /// in flight at that moment is left to finish and its result ignored.
    pub async fn run(&mut self, screen: &mut Screen, cancel: &CancellationToken) -> SessionReport {
        if !self.state.is_listening() {
            warn!(
                session_id = %self.id,
                state = %self.state,
                "Run called on a session that is not listening"
            );
            return self.report();
        }

        while self.state.is_listening() {
            let ticked = match self.timer.as_mut() {
                Some(timer) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    _ = timer.tick() => true,
                },
                // Unreachable while the timer invariant holds.
                None => false,
            };

            if !ticked {
                self.terminate(screen, Termination::Cancelled);
                break;
            }
            self.on_tick(screen, cancel).await;
        }

        let report = self.report();
        info!(
            session_id = %report.session_id,
            termination = ?report.termination,
            attempts = report.attempts,
            "Session finished"
        );
        report
    }

    /// One timer tick.
    async fn on_tick(&mut self, screen: &mut Screen, cancel: &CancellationToken) {
        if self.attempt_count >= self.policy.max_attempts {
            self.terminate(screen, Termination::Timeout);
            return;
        }

        let attempt = self.attempt_count + 1;
        debug!(session_id = %self.id, attempt, "Polling attempt #{attempt}");

        let backend = Arc::clone(&self.backend);
        let mut probe: JoinHandle<Result<BetCheckResult, FetchError>> =
            tokio::spawn(async move { backend.check_for_new_bet().await });

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.terminate(screen, Termination::Cancelled);
                discard_late_probe(self.id, probe);
                return;
            }
            joined = &mut probe => joined,
        };

        let result = joined.unwrap_or_else(|e| {
            Err(FetchError::Task {
                endpoint: CHECK_NEW_BET_PATH.to_string(),
                message: e.to_string(),
            })
        });

        match result {
            Ok(check) if check.new_bet => {
                let streak = check.display_streak(screen.displayed_streak());
                self.terminate(screen, Termination::Success { streak });
                screen.set_streak(streak);
                self.host.notify_success();
                self.host.show_alert(&bet_detected_alert(streak));
                refresh_status(&*self.backend, screen).await;
            }
            Ok(_) => {
                debug!(session_id = %self.id, "No new bet yet");
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Bet check failed");
                self.terminate(screen, Termination::Error);
            }
        }

        self.attempt_count += 1;
    }

    /// Release the timer, re-enable place-bet and update the banner.
    ///
    /// Runs at most once; later calls are no-ops.
    pub fn terminate(&mut self, screen: &mut Screen, reason: Termination) {
        if self.state.is_terminated() {
            debug!(session_id = %self.id, state = %self.state, "Already terminated");
            return;
        }

        self.timer = None;
        screen.end_listening(reason.message());
        self.state = SessionState::Terminated(reason);
        self.ended_at = Some(Utc::now());

        info!(
            session_id = %self.id,
            termination = %reason,
            attempts = self.attempt_count,
            "Session terminated"
        );
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            session_id: self.id,
            termination: self.state.termination(),
            attempts: self.attempt_count,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

/// Let an orphaned probe finish and log what it would have reported.
fn discard_late_probe(session_id: Uuid, probe: JoinHandle<Result<BetCheckResult, FetchError>>) {
    tokio::spawn(async move {
        if let Ok(result) = probe.await {
            debug!(
                session_id = %session_id,
                new_bet = result.as_ref().map(|r| r.new_bet).ok(),
                "Discarding probe result after termination"
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
