//! Poll timer.
//!
//! A repeating timer owned by exactly one session. Dropping it disarms
//! it; there is no separate cancel call to forget.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

pub struct PollTimer {
    interval: Interval,
    armed_at: Instant,
}

impl PollTimer {
    /// Arm a timer whose first tick fires one full `period` from now.
    ///
    /// A tick that is late because the previous one was still being
    /// processed fires once, and the schedule restarts from there.
    pub fn arm(period: Duration) -> Self {
        let armed_at = Instant::now();
        let mut interval = time::interval_at(armed_at + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, armed_at }
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    pub fn armed_at(&self) -> Instant {
        self.armed_at
    }
}
