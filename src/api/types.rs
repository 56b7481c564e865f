//! API response types

use serde::{Deserialize, Serialize};

/// Response of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    /// Whether a workload run is active
    pub running: bool,
    pub timestamp: String,
}

/// Plain outcome of a command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    pub result: String,
}

impl CommandResponse {
    pub fn new(result: impl ToString) -> Self {
        Self {
            result: result.to_string(),
        }
    }
}
