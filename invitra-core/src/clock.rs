//! Clock abstraction for time-dependent cache decisions.
//!
//! The dedup cache never reads wall-clock time directly. It asks a [`Clock`],
//! so tests can drive expiry deterministically with a [`ManualClock`].

use crate::Timestamp;
use chrono::Utc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of the current time.
///
/// Production implementations must be monotonic.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Production clock: a wall-clock anchor advanced by a monotonic [`Instant`].
///
/// System time adjustments after construction do not move readings
/// backwards.
#[derive(Debug, Clone)]
pub struct SystemClock {
    anchor: Timestamp,
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            anchor: Utc::now(),
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let elapsed = chrono::Duration::from_std(self.start.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor + elapsed
    }
}

/// Hand-driven clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Jump to an arbitrary time. May move backwards, which lets tests
    /// exercise the monotonic timestamp guarantee of the cache.
    pub fn set(&self, to: Timestamp) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
