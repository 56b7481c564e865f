//! API shared state

use std::sync::Arc;

use crate::config::Config;
use crate::workload::Workload;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// The workload engine every handler drives
    pub workload: Workload,

    /// Used to derive target addresses from ids
    pub config: Arc<Config>,
}

impl ApiState {
    pub fn new(workload: Workload, config: Config) -> Self {
        Self {
            workload,
            config: Arc::new(config),
        }
    }
}
