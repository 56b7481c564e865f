//! Test helpers: a scripted database double and workload builders

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use workload_bench::{
    ResultSet, Target, Value, Workload, WorkloadError, WorkloadResult,
    actors::worker::MODEL_QUERY,
    client::{AccessMode, ClientFactory, CountingTimestamps, Credentials, DatabaseClient},
    config::WorkloadConfig,
};

/// How a scripted target answers
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Refuse every session
    pub unreachable: bool,

    /// Rows returned by the model query
    pub model_rows: usize,

    /// Rows returned by the read and write queries
    pub rows: usize,

    /// Latency of every query
    pub delay: Duration,

    /// Latency of the model query, if it differs
    pub model_delay: Option<Duration>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            unreachable: false,
            model_rows: 1,
            rows: 1,
            delay: Duration::from_millis(2),
            model_delay: None,
        }
    }
}

/// Client factory whose targets follow a per-id [`Behavior`]
///
/// Behaviors can be changed while a workload is running.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    behaviors: Arc<Mutex<HashMap<String, Behavior>>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(id.to_string(), behavior);
    }

    fn behavior(&self, id: &str) -> Behavior {
        self.behaviors
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

struct ScriptedSession {
    behavior: Behavior,
}

fn rows(count: usize) -> ResultSet {
    let mut result = ResultSet::new(["n.counter"]);
    for i in 0..count {
        result.push(vec![Value::from(i as i64)]);
    }
    result
}

#[async_trait]
impl DatabaseClient for ScriptedSession {
    async fn check(&self) -> WorkloadResult<()> {
        Ok(())
    }

    async fn run_query(&self, _mode: AccessMode, query: &str) -> WorkloadResult<ResultSet> {
        if query == MODEL_QUERY {
            let delay = self.behavior.model_delay.unwrap_or(self.behavior.delay);
            tokio::time::sleep(delay).await;
            Ok(rows(self.behavior.model_rows))
        } else {
            tokio::time::sleep(self.behavior.delay).await;
            Ok(rows(self.behavior.rows))
        }
    }

    async fn close(&self) -> WorkloadResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ClientFactory for ScriptedFactory {
    async fn connect(
        &self,
        target: &Target,
        _mode: AccessMode,
    ) -> WorkloadResult<Box<dyn DatabaseClient>> {
        let behavior = self.behavior(&target.id);
        if behavior.unreachable {
            return Err(WorkloadError::connectivity(&target.id, "connection refused"));
        }
        Ok(Box::new(ScriptedSession { behavior }))
    }
}

pub fn test_config(tick_ms: u64) -> WorkloadConfig {
    WorkloadConfig {
        tick_ms,
        max_errors: 3,
        ..WorkloadConfig::default()
    }
}

pub fn create_workload(factory: &ScriptedFactory, tick_ms: u64) -> Workload {
    Workload::new(
        Arc::new(factory.clone()),
        Arc::new(CountingTimestamps::new()),
        test_config(tick_ms),
    )
}

pub fn create_target(id: &str) -> Target {
    Target::new(
        id,
        format!("https://{id}-test.example"),
        Credentials::new("neo4j", "secret"),
    )
}

/// Workload with the given targets registered
pub async fn workload_with(factory: &ScriptedFactory, tick_ms: u64, ids: &[&str]) -> Workload {
    let workload = create_workload(factory, tick_ms);
    for id in ids {
        workload.add(create_target(id)).await.unwrap();
    }
    workload
}

/// Poll `condition` until it holds or fail after five seconds
pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn count(result: &ResultSet, id: &str, operation: &str) -> Option<i64> {
    result
        .rows
        .iter()
        .find(|row| row[0] == Value::from(id) && row[1] == Value::from(operation))
        .and_then(|row| row[2].as_i64())
}
