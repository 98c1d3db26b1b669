//! Fixed-window call accounting for upstream requests

use chrono::{DateTime, Duration, Utc};

/// Calls made in the current window, bounded by the limit
#[derive(Debug, Clone)]
pub struct RateWindow {
    started_at: DateTime<Utc>,
    calls: u32,
    limit: u32,
    length: Duration,
}

impl RateWindow {
    /// Create a window starting at `now`
    pub fn new(limit: u32, length: Duration, now: DateTime<Utc>) -> Self {
        Self { started_at: now, calls: 0, limit, length }
    }

    /// Start a fresh window if the current one has run its length.
    /// Returns true when the window was reset.
    pub fn roll(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.started_at >= self.length {
            self.reset(now);
            true
        } else {
            false
        }
    }

    /// Start a fresh window at `now`
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.started_at = now;
        self.calls = 0;
    }

    /// No calls left in this window
    pub fn is_exhausted(&self) -> bool {
        self.calls >= self.limit
    }

    /// Time until the window rolls over, never negative and never longer than
    /// one window
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.started_at + self.length - now;
        remaining.max(Duration::zero()).min(self.length)
    }

    /// Count one completed upstream call
    pub fn record_call(&mut self) {
        self.calls = (self.calls + 1).min(self.limit);
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
