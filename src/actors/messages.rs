//! Message types for actor communication
//!
//! Workers publish one [`WorkloadMessage`] per query attempt into the shared
//! bounded channel. The aggregator is the only consumer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::client::AccessMode;

/// What a message reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A successful query, the value is its duration in milliseconds
    Sample(AccessMode),

    /// A failed query, the value is the worker's error count so far
    Error(AccessMode),

    /// The model could not be initialised on the target, the value is -1
    ModelError,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Sample(operation) => write!(f, "{operation}"),
            MessageKind::Error(operation) => write!(f, "{operation}:error"),
            MessageKind::ModelError => write!(f, "model:error"),
        }
    }
}

/// Outcome of one query attempt against one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadMessage {
    pub kind: MessageKind,
    pub target_id: String,
    pub value: i64,
}

impl WorkloadMessage {
    pub fn sample(operation: AccessMode, target_id: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            kind: MessageKind::Sample(operation),
            target_id: target_id.into(),
            value: duration_ms,
        }
    }

    pub fn error(operation: AccessMode, target_id: impl Into<String>, error_count: i64) -> Self {
        Self {
            kind: MessageKind::Error(operation),
            target_id: target_id.into(),
            value: error_count,
        }
    }

    pub fn model_error(target_id: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::ModelError,
            target_id: target_id.into(),
            value: -1,
        }
    }
}

/// Counters kept by the aggregator for one run
#[derive(Debug, Default)]
pub struct RunCounters {
    messages: AtomicU64,
    samples: AtomicU64,
    errors: AtomicU64,
}

impl RunCounters {
    pub fn record(&self, kind: MessageKind) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        match kind {
            MessageKind::Sample(_) => self.samples.fetch_add(1, Ordering::Relaxed),
            MessageKind::Error(_) | MessageKind::ModelError => {
                self.errors.fetch_add(1, Ordering::Relaxed)
            }
        };
    }

    pub fn snapshot(&self) -> RunStats {
        RunStats {
            messages: self.messages.load(Ordering::Relaxed),
            samples: self.samples.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`RunCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Messages consumed by the aggregator
    pub messages: u64,

    /// Samples appended to the store
    pub samples: u64,

    /// Error and model-error messages seen
    pub errors: u64,
}
