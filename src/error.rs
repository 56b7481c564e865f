//! Error types for workload operations

use thiserror::Error;

/// Result type alias for workload operations
pub type WorkloadResult<T> = Result<T, WorkloadError>;

/// Errors surfaced by the registry, the orchestrator and the table builder
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// A target could not be reached while registering it
    #[error("could not connect to '{target_id}': {reason}")]
    Connectivity { target_id: String, reason: String },

    /// No registered target carries the given id
    #[error("could not find client for database '{0}'")]
    NotFound(String),

    /// `start` was called while a run is active
    #[error("already started")]
    AlreadyStarted,

    /// `stop` was called while no run is active
    #[error("already stopped")]
    AlreadyStopped,

    /// Operation name outside of `read` and `write`
    #[error("invalid result operation: {0}")]
    InvalidOperation(String),

    /// A single query against a target failed
    #[error("query failed: {0}")]
    Query(String),

    /// A table column has no samples to fill its gaps from
    #[error("column '{0}' has no samples")]
    DegenerateColumn(String),

    /// The recorded ticks span more rows than a table can hold
    #[error("tick range {min}..={max} is too large for a table")]
    TickRange { min: i64, max: i64 },

    /// Waiting was cancelled before the threshold was reached
    #[error("wait cancelled after reaching {0} results")]
    Cancelled(usize),
}

impl WorkloadError {
    pub fn connectivity(target_id: impl Into<String>, reason: impl ToString) -> Self {
        WorkloadError::Connectivity {
            target_id: target_id.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for WorkloadError {
    fn from(err: reqwest::Error) -> Self {
        WorkloadError::Query(err.to_string())
    }
}
