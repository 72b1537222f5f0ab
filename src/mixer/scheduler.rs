//! Fixed-interval tick scheduling.
//!
//! The UI frame loop asks the scheduler whether a tick is due instead of
//! owning a timer, so the mixer itself never depends on wall-clock time.

use std::time::{Duration, Instant};

/// Default reconciliation interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Shortest interval accepted from configuration.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Decides when the next reconciliation tick runs.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl TickScheduler {
    /// Create a scheduler whose first tick is due immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_TICK_INTERVAL),
            last_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check whether a tick is due at `now`, and if so record it as run.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.last_tick {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };

        if due {
            self.last_tick = Some(now);
        }
        due
    }

    /// Time left until the next tick is due.
    pub fn time_until_next(&self, now: Instant) -> Duration {
        match self.last_tick {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}
