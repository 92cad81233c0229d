//! Scripted backend and recording host for integration testing.
//!
//! `ScriptedBackend` answers probes from a queue and counts every call,
//! including how many probes were in flight at once. `RecordingHost`
//! keeps every host call in order. All state is in-memory.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use betwatch::backend::{BetProbe, StatusReader, CHECK_NEW_BET_PATH};
use betwatch::host::HostPlatform;
use betwatch::types::*;

/// One scripted probe answer.
#[derive(Debug, Clone)]
pub enum ProbeAnswer {
    NoBet,
    Bet(Option<i64>),
    Fail,
}

#[derive(Debug, Default)]
struct Counters {
    probes: u32,
    status_fetches: u32,
    in_flight: u32,
    max_in_flight: u32,
}

pub struct ScriptedBackend {
    answers: Mutex<VecDeque<ProbeAnswer>>,
    status: Mutex<Result<(i64, String), ()>>,
    history: Mutex<Option<Vec<HistoryEntry>>>,
    probe_delay: Duration,
    counters: Mutex<Counters>,
}

impl ScriptedBackend {
    /// Probes answer from `answers`, then `NoBet` forever.
    pub fn new(answers: Vec<ProbeAnswer>) -> Arc<Self> {
        Self::with_probe_delay(answers, Duration::ZERO)
    }

    pub fn with_probe_delay(answers: Vec<ProbeAnswer>, probe_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            status: Mutex::new(Ok((0, "Waiting".to_string()))),
            history: Mutex::new(Some(Vec::new())),
            probe_delay,
            counters: Mutex::new(Counters::default()),
        })
    }

    /// `n` negative answers.
    pub fn misses(n: usize) -> Vec<ProbeAnswer> {
        vec![ProbeAnswer::NoBet; n]
    }

    pub fn set_status(&self, streak: i64, status: &str) {
        *self.status.lock().unwrap() = Ok((streak, status.to_string()));
    }

    pub fn fail_status(&self) {
        *self.status.lock().unwrap() = Err(());
    }

    pub fn set_history(&self, history: Option<Vec<HistoryEntry>>) {
        *self.history.lock().unwrap() = history;
    }

    pub fn probes(&self) -> u32 {
        self.counters.lock().unwrap().probes
    }

    pub fn status_fetches(&self) -> u32 {
        self.counters.lock().unwrap().status_fetches
    }

    pub fn max_in_flight(&self) -> u32 {
        self.counters.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl StatusReader for ScriptedBackend {
    async fn fetch_status(&self) -> Result<StatusSnapshot, FetchError> {
        self.counters.lock().unwrap().status_fetches += 1;
        match self.status.lock().unwrap().clone() {
            Ok((streak, status)) => Ok(StatusSnapshot {
                streak,
                status,
                fetched_at: Utc::now(),
            }),
            Err(()) => Err(FetchError::Transport {
                endpoint: "/api/status".into(),
                message: "down".into(),
            }),
        }
    }

    async fn fetch_profile(&self) -> Result<ProfileSnapshot, FetchError> {
        Err(FetchError::Status {
            endpoint: "/api/user-profile".into(),
            status: 404,
        })
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, FetchError> {
        self.history.lock().unwrap().clone().ok_or(FetchError::Transport {
            endpoint: "/api/bet-history".into(),
            message: "down".into(),
        })
    }
}

#[async_trait]
impl BetProbe for ScriptedBackend {
    async fn check_for_new_bet(&self) -> Result<BetCheckResult, FetchError> {
        {
            let mut c = self.counters.lock().unwrap();
            c.probes += 1;
            c.in_flight += 1;
            c.max_in_flight = c.max_in_flight.max(c.in_flight);
        }

        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }

        self.counters.lock().unwrap().in_flight -= 1;

        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProbeAnswer::NoBet);

        match answer {
            ProbeAnswer::NoBet => Ok(BetCheckResult { new_bet: false, bet: None }),
            ProbeAnswer::Bet(streak) => Ok(BetCheckResult {
                new_bet: true,
                bet: Some(DetectedBet { streak }),
            }),
            ProbeAnswer::Fail => Err(FetchError::Transport {
                endpoint: CHECK_NEW_BET_PATH.into(),
                message: "connection reset".into(),
            }),
        }
    }
}

/// A host call, as recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Ready,
    Expand,
    Open(String),
    NotifySuccess,
    Alert(String),
}

#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl HostPlatform for RecordingHost {
    fn ready(&self) {
        self.record(HostCall::Ready);
    }

    fn expand(&self) {
        self.record(HostCall::Expand);
    }

    fn open_external_surface(&self, url: &str) {
        self.record(HostCall::Open(url.to_string()));
    }

    fn notify_success(&self) {
        self.record(HostCall::NotifySuccess);
    }

    fn show_alert(&self, text: &str) {
        self.record(HostCall::Alert(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_answers_in_order() {
        let backend = ScriptedBackend::new(vec![ProbeAnswer::NoBet, ProbeAnswer::Bet(Some(4))]);
        assert!(!backend.check_for_new_bet().await.unwrap().new_bet);
        let hit = backend.check_for_new_bet().await.unwrap();
        assert!(hit.new_bet);
        assert_eq!(hit.bet.unwrap().streak, Some(4));
        // Exhausted script keeps answering "no bet".
        assert!(!backend.check_for_new_bet().await.unwrap().new_bet);
        assert_eq!(backend.probes(), 3);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let backend = ScriptedBackend::new(vec![ProbeAnswer::Fail]);
        let err = backend.check_for_new_bet().await.unwrap_err();
        assert_eq!(err.endpoint(), CHECK_NEW_BET_PATH);
    }

    #[test]
    fn test_recording_host_keeps_order() {
        let host = RecordingHost::new();
        host.ready();
        host.show_alert("hi");
        assert_eq!(host.calls(), vec![HostCall::Ready, HostCall::Alert("hi".into())]);
    }
}
