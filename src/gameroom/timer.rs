use std::time::Duration;
use tokio::time::Instant;

/// Named delays for the dealer loop. Every one can be zeroed or disabled,
/// and none of them carries ordering guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// How long a call window stays open for the client. `None` waits.
    pub decision: Option<Duration>,
    /// How long the client may take to discard before the autopilot plays.
    pub discard: Option<Duration>,
    /// Pause between automated steps, purely presentational.
    pub pacing: Duration,
    /// How long to wait for `nextready` before dealing anyway.
    pub ready: Option<Duration>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            decision: Some(Duration::from_secs(10)),
            discard: None,
            pacing: Duration::ZERO,
            ready: None,
        }
    }
}

impl TimerConfig {
    /// No pacing and no deadlines except a short call window.
    pub fn instant() -> Self {
        Self {
            decision: Some(Duration::from_millis(200)),
            discard: None,
            pacing: Duration::ZERO,
            ready: None,
        }
    }
}

/// Deadline tracking for one pending client decision.
#[derive(Debug)]
pub struct Timer {
    config: TimerConfig,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            deadline: None,
        }
    }
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }
    pub fn start_decision(&mut self) {
        self.deadline = self.config.decision.map(|d| Instant::now() + d);
    }
    pub fn start_discard(&mut self) {
        self.deadline = self.config.discard.map(|d| Instant::now() + d);
    }
    /// Time left on the running deadline; `None` when nothing is running.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
    /// Sleeps for the configured pacing, skipping the timer entirely at zero.
    pub async fn pace(&self) {
        if !self.config.pacing.is_zero() {
            tokio::time::sleep(self.config.pacing).await;
        }
    }
}
