//! Logical tick sources for stamping samples

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Produces non-decreasing ticks
pub trait TimestampSource: Send + Sync {
    fn next(&self) -> i64;
}

/// Unix seconds from the wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClockTimestamps;

impl TimestampSource for WallClockTimestamps {
    fn next(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Counts up by one on every call, starting at 1
#[derive(Debug, Default)]
pub struct CountingTimestamps {
    counter: AtomicI64,
}

impl CountingTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue counting after `start`
    pub fn starting_after(start: i64) -> Self {
        Self {
            counter: AtomicI64::new(start),
        }
    }
}

impl TimestampSource for CountingTimestamps {
    fn next(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}
