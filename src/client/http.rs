//! Cypher over the Neo4j HTTP transactional endpoint
//!
//! Every query is sent as a single auto-committed transaction:
//!
//! ```text
//! POST {address}/db/{database}/tx/commit
//! access-mode: READ | WRITE
//! {"statements": [{"statement": "..."}]}
//! ```
//!
//! The first statement result becomes a [`ResultSet`]: its `columns` are the
//! header and every `data[*].row` is a row.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::{AccessMode, ClientFactory, Credentials, DatabaseClient};
use crate::error::{WorkloadError, WorkloadResult};
use crate::registry::Target;
use crate::result::{ResultSet, Value};

const CHECK_QUERY: &str = "MATCH (n) RETURN count(n)";

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    #[serde(default)]
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    code: String,
    message: String,
}

/// Opens [`HttpSession`]s sharing one connection pool
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    client: reqwest::Client,
    database: String,
}

impl HttpClientFactory {
    pub fn new(database: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            database: database.into(),
        })
    }
}

#[async_trait]
impl ClientFactory for HttpClientFactory {
    async fn connect(
        &self,
        target: &Target,
        mode: AccessMode,
    ) -> WorkloadResult<Box<dyn DatabaseClient>> {
        debug!("opening {mode} session for '{}' at {}", target.id, target.address);

        let url = format!(
            "{}/db/{}/tx/commit",
            target.address.trim_end_matches('/'),
            self.database
        );

        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            target_id: target.id.clone(),
            url,
            credentials: target.credentials().clone(),
        }))
    }
}

/// A session against one target
pub struct HttpSession {
    client: reqwest::Client,
    target_id: String,
    url: String,
    credentials: Credentials,
}

#[async_trait]
impl DatabaseClient for HttpSession {
    async fn check(&self) -> WorkloadResult<()> {
        let result = self
            .run_query(AccessMode::Read, CHECK_QUERY)
            .await
            .map_err(|e| WorkloadError::connectivity(&self.target_id, e))?;

        if result.is_empty() {
            return Err(WorkloadError::connectivity(
                &self.target_id,
                "expected at least one record from counting check query",
            ));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(target = %self.target_id))]
    async fn run_query(&self, mode: AccessMode, query: &str) -> WorkloadResult<ResultSet> {
        trace!("running {mode} query");

        let access_mode = match mode {
            AccessMode::Read => "READ",
            AccessMode::Write => "WRITE",
        };

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header("access-mode", access_mode)
            .json(&CommitRequest {
                statements: [Statement { statement: query }],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WorkloadError::Query(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body: CommitResponse = response.json().await?;

        if let Some(error) = body.errors.first() {
            return Err(WorkloadError::Query(format!(
                "{}: {}",
                error.code, error.message
            )));
        }

        let Some(statement) = body.results.into_iter().next() else {
            return Ok(ResultSet::default());
        };

        let mut result = ResultSet::new(statement.columns);
        for data in statement.data {
            result.push(data.row.into_iter().map(Value::from).collect());
        }

        Ok(result)
    }

    async fn close(&self) -> WorkloadResult<()> {
        // Auto-commit transactions hold nothing open between queries
        Ok(())
    }
}
