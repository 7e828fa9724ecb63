use std::time::{Duration, Instant};

/// When the server was last seen dying.
///
/// Starts out as "never". Only a crash-level failure moves it; a successful
/// reconnect leaves it untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrashMark {
    last: Option<Instant>,
    count: u64,
}

impl CrashMark {
    /// A mark that has never been set.
    pub fn never() -> CrashMark {
        CrashMark::default()
    }

    /// Record a crash observed now.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    pub fn record_at(&mut self, at: Instant) {
        self.last = Some(at);
        self.count += 1;
    }

    /// Time of the most recent crash.
    pub fn last(&self) -> Option<Instant> {
        self.last
    }

    /// Number of crashes recorded over the lifetime of the client.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// `true` while `now` lies within `interval` of the last crash, bounds
    /// included. Reconnecting is not attempted during that window.
    pub fn is_backing_off(&self, interval: Duration, now: Instant) -> bool {
        match self.last {
            Some(at) => now.saturating_duration_since(at) <= interval,
            None => false,
        }
    }
}
