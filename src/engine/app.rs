//! Betting app controller.
//!
//! Owns the backend, the host, the poll policy and the `Screen`, and
//! turns user actions into backend reads and detection sessions.
//!
//! `place_bet` borrows the app mutably for the whole session, so a second
//! session can never run alongside the first.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::session::{BetDetectionSession, PollPolicy, SessionReport};
use crate::backend::Backend;
use crate::host::HostPlatform;
use crate::screen::{self, Screen};
use crate::types::SessionError;

pub struct BettingApp {
    backend: Arc<dyn Backend>,
    host: Arc<dyn HostPlatform>,
    policy: PollPolicy,
    screen: Screen,
    launched: bool,
}

impl BettingApp {
    pub fn new(backend: Arc<dyn Backend>, host: Arc<dyn HostPlatform>, policy: PollPolicy) -> Self {
        Self {
            backend,
            host,
            policy,
            screen: Screen::new(),
            launched: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Signal the host and load the initial status.
    ///
    /// Safe to call more than once; only the first call does anything.
    pub async fn launch(&mut self) {
        if self.launched {
            debug!("App already launched");
            return;
        }
        self.launched = true;

        self.host.ready();
        self.host.expand();
        info!(
            interval_secs = self.policy.interval.as_secs(),
            max_attempts = self.policy.max_attempts,
            "App launched"
        );

        self.refresh_status().await;
    }

    pub async fn refresh_status(&mut self) {
        screen::refresh_status(&*self.backend, &mut self.screen).await;
    }

    pub async fn load_profile(&mut self) {
        screen::load_profile(&*self.backend, &mut self.screen).await;
    }

    pub async fn load_history(&mut self) {
        screen::load_history(&*self.backend, &mut self.screen).await;
    }

    /// A fresh, idle session bound to this app's backend and host.
    pub fn new_session(&self) -> BetDetectionSession {
        BetDetectionSession::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.host),
            self.policy.clone(),
        )
    }

    /// Run one detection session to completion.
    ///
    /// Refused while the screen still shows place-bet as disabled.
    pub async fn place_bet(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        if !self.screen.place_bet_enabled() {
            return Err(SessionError::AlreadyListening);
        }

        let mut session = self.new_session();
        session.start(&mut self.screen)?;
        Ok(session.run(&mut self.screen, cancel).await)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
