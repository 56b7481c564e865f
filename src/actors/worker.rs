//! WorkerActor - Puts a steady query load on one target
//!
//! One worker runs per `(target, operation)` pair. Every tick it runs its
//! query, times it, and publishes the outcome to the aggregator.
//!
//! ## Message Flow
//!
//! ```text
//! Sleep tick → Stop signal? → Run query → Publish WorkloadMessage → AggregatorActor
//! ```
//!
//! Failures never leave the worker: each one bumps a local error count and
//! is reported as a `<op>:error` message. Once the count reaches the error
//! budget the worker exits on its own, leaving every other worker alone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::client::{AccessMode, ClientFactory};
use crate::registry::Target;

use super::messages::WorkloadMessage;

/// Creates the single benchmark node, or confirms it exists
pub const MODEL_QUERY: &str = "MERGE (n:ClientBenchmark) ON CREATE SET n.counter = 0 RETURN n.counter";

pub const READ_QUERY: &str = "MATCH (n:ClientBenchmark) RETURN count(n)";

pub const WRITE_QUERY: &str = "MATCH (n:ClientBenchmark) WHERE n.counter IS NOT NULL SET n.counter = n.counter + 1 RETURN n.counter";

/// Rows every workload query is expected to return
pub const EXPECTED_ROWS: usize = 1;

/// Query issued by the worker for an operation
pub fn query_for(operation: AccessMode) -> &'static str {
    match operation {
        AccessMode::Read => READ_QUERY,
        AccessMode::Write => WRITE_QUERY,
    }
}

/// Tuning shared by all workers of a run
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Pause before every query attempt
    pub tick: Duration,

    /// Failed attempts after which the worker gives up
    pub max_errors: u32,
}

/// Actor issuing one operation against one target
pub struct WorkerActor {
    target: Target,
    operation: AccessMode,
    factory: Arc<dyn ClientFactory>,
    message_tx: mpsc::Sender<WorkloadMessage>,

    /// Global running flag of the workload
    running: Arc<AtomicBool>,

    /// This target's stop signal for the current run
    stop: CancellationToken,

    settings: WorkerSettings,
}

impl WorkerActor {
    pub fn new(
        target: Target,
        operation: AccessMode,
        factory: Arc<dyn ClientFactory>,
        message_tx: mpsc::Sender<WorkloadMessage>,
        running: Arc<AtomicBool>,
        stop: CancellationToken,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            target,
            operation,
            factory,
            message_tx,
            running,
            stop,
            settings,
        }
    }

    /// Run the worker until it is stopped or exhausts its error budget
    #[instrument(skip(self), fields(target = %self.target.id, operation = %self.operation))]
    pub async fn run(self) {
        let operation = self.operation;
        let target_id = self.target.id.clone();

        let session = match self.factory.connect(&self.target, operation).await {
            Ok(session) => session,
            Err(e) => {
                warn!("failed to open session: {e}");
                let _ = self
                    .message_tx
                    .send(WorkloadMessage::error(operation, &target_id, -1))
                    .await;
                return;
            }
        };

        let query = query_for(operation);
        let mut errors: u32 = 0;

        debug!("starting workload");

        while self.running.load(Ordering::SeqCst) && errors < self.settings.max_errors {
            tokio::select! {
                _ = tokio::time::sleep(self.settings.tick) => {}
                _ = self.stop.cancelled() => {}
            }

            if self.stop.is_cancelled() {
                debug!("received stop signal");
                self.target.stand_down();
                break;
            }

            trace!("running query");
            let started = Instant::now();

            let message = match session.run_query(operation, query).await {
                Ok(result) if result.len() == EXPECTED_ROWS => {
                    let elapsed = started.elapsed().as_millis() as i64;
                    WorkloadMessage::sample(operation, &target_id, elapsed)
                }
                Ok(result) => {
                    errors += 1;
                    warn!(
                        "expected {EXPECTED_ROWS} rows but got {} (errors={errors})",
                        result.len()
                    );
                    WorkloadMessage::error(operation, &target_id, errors as i64)
                }
                Err(e) => {
                    errors += 1;
                    warn!("query failed (errors={errors}): {e}");
                    WorkloadMessage::error(operation, &target_id, errors as i64)
                }
            };

            if self.message_tx.send(message).await.is_err() {
                debug!("aggregator is gone");
                break;
            }
        }

        if let Err(e) = session.close().await {
            warn!("failed to close session: {e}");
        }

        debug!("finished workload (errors={errors})");
    }
}
