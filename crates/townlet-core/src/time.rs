//! Wall-clock time for production cycles and offline catch-up
//!
//! The engine never reads the system clock itself. Every action receives the
//! current `Timestamp` from the caller, which keeps the core deterministic
//! and lets tests move time explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Seconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Create a timestamp from Unix seconds
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Get the raw Unix seconds
    pub fn secs(&self) -> i64 {
        self.0
    }

    /// Whole seconds elapsed since `earlier`, zero if `earlier` lies in the future
    pub fn elapsed_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0).max(0) as u64
    }

    /// This timestamp moved forward by `secs` seconds
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs as i64))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}s", self.0)
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    /// The current wall-clock time
    fn now(&self) -> Timestamp;
}

/// A manually driven clock
#[derive(Debug, Default)]
pub struct FixedClock {
    secs: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            secs: AtomicI64::new(start.0),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs as i64, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, at: Timestamp) {
        self.secs.store(at.0, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.secs.load(Ordering::SeqCst))
    }
}
