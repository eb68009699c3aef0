//! Wall-clock abstraction.
//!
//! Game time is virtual and advanced by the host; this clock only stamps
//! journal events so a session can be correlated with logs.

use chrono::{DateTime, Utc};

/// Source of wall-clock timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
