//! Database client capability
//!
//! The workload never talks to a database directly. It asks a
//! [`ClientFactory`] for a [`DatabaseClient`] session per target and access
//! mode, which keeps the orchestrator testable with scripted doubles.
//!
//! - **http**: Cypher over the Neo4j HTTP transactional endpoint (production)
//! - **timestamps**: logical tick sources used to stamp samples

pub mod http;
pub mod timestamps;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{WorkloadError, WorkloadResult};
use crate::registry::Target;
use crate::result::ResultSet;

pub use timestamps::{CountingTimestamps, TimestampSource, WallClockTimestamps};

/// Whether a query only reads or also writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub const ALL: [AccessMode; 2] = [AccessMode::Read, AccessMode::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessMode {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(AccessMode::Read),
            "write" => Ok(AccessMode::Write),
            other => Err(WorkloadError::InvalidOperation(other.to_string())),
        }
    }
}

/// Username and password handed to the database on every session
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// An open session against one target
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Verify the target answers queries at all
    async fn check(&self) -> WorkloadResult<()>;

    /// Run a single query in the given access mode
    async fn run_query(&self, mode: AccessMode, query: &str) -> WorkloadResult<ResultSet>;

    /// Release the session
    async fn close(&self) -> WorkloadResult<()>;
}

/// Creates client sessions for targets
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(
        &self,
        target: &Target,
        mode: AccessMode,
    ) -> WorkloadResult<Box<dyn DatabaseClient>>;
}
