//! Time source abstraction
//!
//! Expiry decisions depend on wall-clock time; tests need to control it.
//! Production code holds a [`Clock`] backed by chrono; tests inject a
//! [`ManualClock`] and advance it explicitly.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::core_types::TimestampMs;

/// Shared time source returning Unix epoch milliseconds.
///
/// Cloning is cheap; all clones observe the same underlying source.
#[derive(Clone)]
pub struct Clock {
    now_fn: Arc<dyn Fn() -> TimestampMs + Send + Sync>,
}

impl Clock {
    /// Wall-clock time.
    pub fn system() -> Self {
        Self {
            now_fn: Arc::new(|| Utc::now().timestamp_millis()),
        }
    }

    /// Custom time function, for deterministic tests.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> TimestampMs + Send + Sync + 'static,
    {
        Self { now_fn: Arc::new(f) }
    }

    /// Current time in epoch milliseconds.
    pub fn now(&self) -> TimestampMs {
        (self.now_fn)()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

/// Hand-driven clock for tests.
///
/// `clock()` hands out a [`Clock`] view; `set`/`advance` move time for
/// every view already handed out.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: TimestampMs) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn clock(&self) -> Clock {
        let now = Arc::clone(&self.now);
        Clock::from_fn(move || now.load(Ordering::SeqCst))
    }

    pub fn now(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }

    pub fn set(&self, at: TimestampMs) {
        self.now.store(at, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}
