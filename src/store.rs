//! In-memory metric series store
//!
//! Holds one append-only series of `(timestamp, duration)` samples per
//! `(operation, target)` pair. The aggregator actor is the only writer;
//! accessors read through the workload's `RwLock`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::client::{AccessMode, TimestampSource};

/// One timed query result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    /// Logical tick from the timestamp source
    pub timestamp: i64,
    /// Query duration in milliseconds
    pub duration: i64,
}

/// Samples of one operation against one target, in arrival order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub target_id: String,
    pub operation: AccessMode,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn empty(target_id: impl Into<String>, operation: AccessMode) -> Self {
        Self {
            target_id: target_id.into(),
            operation,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.samples.last().map(|s| s.timestamp)
    }
}

/// Series keyed by `operation:target`
pub struct MetricStore {
    timestamps: Arc<dyn TimestampSource>,
    series: HashMap<String, Series>,
}

fn key(operation: AccessMode, target_id: &str) -> String {
    format!("{operation}:{target_id}")
}

impl MetricStore {
    pub fn new(timestamps: Arc<dyn TimestampSource>) -> Self {
        Self {
            timestamps,
            series: HashMap::new(),
        }
    }

    /// Append a sample stamped with the next tick
    pub fn add(&mut self, operation: AccessMode, target_id: &str, duration: i64) {
        let timestamp = self.timestamps.next();
        trace!("{operation}:{target_id} <- ({timestamp}, {duration})");

        self.series
            .entry(key(operation, target_id))
            .or_insert_with(|| Series::empty(target_id, operation))
            .samples
            .push(Sample {
                timestamp,
                duration,
            });
    }

    /// The series for a target, empty if nothing was recorded
    pub fn for_target(&self, target_id: &str, operation: AccessMode) -> Series {
        self.series
            .get(&key(operation, target_id))
            .cloned()
            .unwrap_or_else(|| Series::empty(target_id, operation))
    }

    pub fn len(&self, target_id: &str, operation: AccessMode) -> usize {
        self.series
            .get(&key(operation, target_id))
            .map_or(0, Series::len)
    }

    /// Total samples across every series
    pub fn total(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    /// Smallest first and largest last timestamp over non-empty series.
    ///
    /// An empty store yields `(i64::MAX, i64::MIN)`, which callers must treat
    /// as "no range".
    pub fn min_max(&self) -> (i64, i64) {
        self.series
            .values()
            .filter_map(|series| Some((series.first_timestamp()?, series.last_timestamp()?)))
            .fold((i64::MAX, i64::MIN), |(min, max), (first, last)| {
                (min.min(first), max.max(last))
            })
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}
