//! Refresh timers for the two remote syncs.
//!
//! Timestamps are milliseconds on a monotonic clock that starts near zero at
//! boot. They are signed so a timer can be seeded in the past.

/// Monotonic milliseconds since boot.
pub type Millis = i64;

pub const ONE_MIN_MS: Millis = 60 * 1000;
pub const ONE_HOUR_MS: Millis = 60 * ONE_MIN_MS;

/// True when strictly more than `interval` has elapsed since `last`.
pub fn is_due(now: Millis, last: Millis, interval: Millis) -> bool {
    now.saturating_sub(last) > interval
}

/// One independently scheduled refresh (time sync or weather sync).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTimer {
    interval: Millis,
    last: Millis,
}

impl RefreshTimer {
    /// New timer that is already due on the first check, whatever the
    /// monotonic clock reads at that point.
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            last: -interval - 1,
        }
    }

    pub fn is_due(&self, now: Millis) -> bool {
        is_due(now, self.last, self.interval)
    }

    /// Record a successful refresh. Failed attempts must not call this.
    pub fn mark_refreshed(&mut self, now: Millis) {
        self.last = now;
    }

    pub fn last(&self) -> Millis {
        self.last
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }
}
