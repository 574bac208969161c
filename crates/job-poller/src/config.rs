//! Poll cadence and attempt budget.

use std::time::Duration;

/// Fixed-interval polling with a bounded number of status calls.
///
/// Worst-case wall time before timeout is roughly `max_attempts * interval`
/// plus per-call latency; it is a soft bound, not a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum number of status calls (`M`).
    pub max_attempts: u32,
    /// Delay between a non-terminal response and the next call (`D`).
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_millis(5000),
        }
    }
}

impl PollConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Read `POLL_MAX_ATTEMPTS` and `POLL_INTERVAL_MS`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_attempts = std::env::var("POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_attempts);
        let interval = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);
        Self::new(max_attempts, interval)
    }

    /// Upper estimate of time spent waiting between calls before a timeout.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}
