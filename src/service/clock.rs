//! Monotonic ingestion timestamps
//!
//! Wall-clock time can step backwards (NTP adjustments, VM migration). Report
//! timestamps must not, so the clock never hands out a value older than one it
//! has already returned or observed.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Non-decreasing UTC clock with microsecond resolution
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time, or the latest time already handed out if that is later
    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let previous = self.last_micros.fetch_max(wall, Ordering::SeqCst);
        DateTime::from_timestamp_micros(previous.max(wall)).unwrap_or_else(Utc::now)
    }

    /// Make sure later `now()` calls are not older than `timestamp`
    pub fn observe(&self, timestamp: DateTime<Utc>) {
        self.last_micros
            .fetch_max(timestamp.timestamp_micros(), Ordering::SeqCst);
    }
}
