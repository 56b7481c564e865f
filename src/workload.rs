//! Workload orchestration
//!
//! [`Workload`] is the one context object owning the target registry, the
//! global running flag and the metric store. It is cheap to clone and is
//! handed to the serving layer as shared state.
//!
//! ## Lifecycle
//!
//! ```text
//!   Stopped --start()--> Running --stop()--> Stopped
//! ```
//!
//! `start` claims the run, clears the store, initialises the model on every
//! target and spawns a read and a write worker per initialised target plus a
//! single aggregator. `stop` fires the stop signals and returns immediately; use
//! [`Workload::shutdown`] to also wait for every actor to finish.
//!
//! ## Locking
//!
//! Registry and lifecycle share one mutex. The store sits behind its own
//! `RwLock` with the aggregator as the only writer. Where both are needed the
//! mutex is taken first. Nothing waits on a target while holding the mutex,
//! so model setup in `start` runs between two short critical sections.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::actors::aggregator::AggregatorActor;
use crate::actors::messages::{RunCounters, RunStats, WorkloadMessage};
use crate::actors::worker::{EXPECTED_ROWS, MODEL_QUERY, WorkerActor};
use crate::client::{AccessMode, ClientFactory, TimestampSource};
use crate::config::WorkloadConfig;
use crate::error::{WorkloadError, WorkloadResult};
use crate::registry::{Target, TargetRegistry};
use crate::result::{ResultSet, Value};
use crate::store::{MetricStore, Series};
use crate::table::build_table;

/// Shared handle to the workload engine
#[derive(Clone)]
pub struct Workload {
    inner: Arc<Inner>,
}

struct Inner {
    factory: Arc<dyn ClientFactory>,
    config: WorkloadConfig,
    running: Arc<AtomicBool>,
    state: Mutex<State>,
    store: Arc<RwLock<MetricStore>>,
}

#[derive(Default)]
struct State {
    registry: TargetRegistry,
    run: Option<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
    counters: Arc<RunCounters>,
}

impl Workload {
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        timestamps: Arc<dyn TimestampSource>,
        config: WorkloadConfig,
    ) -> Self {
        info!("creating workload service");
        Self {
            inner: Arc::new(Inner {
                factory,
                config,
                running: Arc::new(AtomicBool::new(false)),
                state: Mutex::new(State::default()),
                store: Arc::new(RwLock::new(MetricStore::new(timestamps))),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register a target after checking it is reachable
    pub async fn add(&self, target: Target) -> WorkloadResult<()> {
        let mut state = self.inner.state.lock().await;
        state
            .registry
            .add(target, self.inner.factory.as_ref())
            .await
    }

    /// Unregister the first target with this id.
    ///
    /// Its workers are not stopped; they run until the next `stop` or until
    /// their error budget is spent.
    pub async fn remove(&self, id: &str) -> WorkloadResult<Target> {
        self.inner.state.lock().await.registry.remove(id)
    }

    pub async fn find(&self, id: &str) -> WorkloadResult<Target> {
        self.inner.state.lock().await.registry.find(id)
    }

    /// Registered targets sorted by id
    pub async fn list(&self) -> Vec<Target> {
        self.inner.state.lock().await.registry.list()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Begin a run.
    ///
    /// The registry lock is only held to claim the run and later to record the
    /// spawned workers; model setup against the targets runs without it. A
    /// `stop` arriving during model setup ends the run before any worker is
    /// spawned.
    pub async fn start(&self) -> WorkloadResult<()> {
        let (targets, run, message_tx) = {
            let mut state = self.inner.state.lock().await;

            if self
                .inner
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(WorkloadError::AlreadyStarted);
            }

            let targets: Vec<Target> = state.registry.iter().cloned().collect();
            info!("starting workload against {} targets", targets.len());

            let (message_tx, message_rx) = mpsc::channel(self.inner.config.channel_capacity);
            let run = CancellationToken::new();
            let counters = Arc::new(RunCounters::default());

            self.inner.store.write().await.clear();

            // Finished handles of earlier runs
            state.tasks.retain(|task| !task.is_finished());

            let aggregator = AggregatorActor::new(
                message_rx,
                self.inner.store.clone(),
                counters.clone(),
                self.inner.running.clone(),
                run.clone(),
            );
            state.tasks.push(tokio::spawn(aggregator.run()));
            state.run = Some(run.clone());
            state.counters = counters;

            (targets, run, message_tx)
        };

        let initialised = join_all(targets.iter().map(|target| self.init_model(target))).await;

        let mut state = self.inner.state.lock().await;

        if run.is_cancelled() {
            info!("stopped during model setup, no workers spawned");
            return Ok(());
        }

        for (target, init) in targets.into_iter().zip(initialised) {
            if let Err(e) = init {
                warn!("failed to set up model for '{}': {e}", target.id);
                // the aggregator drains the channel without the registry lock
                let _ = message_tx
                    .send(WorkloadMessage::model_error(&target.id))
                    .await;
                continue;
            }

            let stop = target.arm(&run);
            target.set_running(true);

            for operation in AccessMode::ALL {
                let worker = WorkerActor::new(
                    target.clone(),
                    operation,
                    self.inner.factory.clone(),
                    message_tx.clone(),
                    self.inner.running.clone(),
                    stop.clone(),
                    self.inner.config.worker_settings(),
                );
                state.tasks.push(tokio::spawn(worker.run()));
            }
        }

        Ok(())
    }

    /// Signal every worker and the aggregator to exit, without waiting
    pub async fn stop(&self) -> WorkloadResult<()> {
        let state = self.inner.state.lock().await;

        if !self.is_running() {
            return Err(WorkloadError::AlreadyStopped);
        }

        info!("stopping workload");
        self.inner.running.store(false, Ordering::SeqCst);

        for target in state.registry.iter() {
            target.signal_stop();
        }

        // Reaches workers of targets removed while running
        if let Some(run) = &state.run {
            run.cancel();
        }

        Ok(())
    }

    /// Stop if running, then wait until every actor has finished
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop().await {
            debug!("shutdown: {e}");
        }

        let tasks = std::mem::take(&mut self.inner.state.lock().await.tasks);
        debug!("waiting for {} actors", tasks.len());

        for result in join_all(tasks).await {
            if let Err(e) = result {
                warn!("actor ended abnormally: {e}");
            }
        }
    }

    /// Poll every tick until some series holds at least `threshold` samples.
    ///
    /// Never gives up on its own.
    pub async fn wait_for_at_least(&self, threshold: usize) -> WorkloadResult<usize> {
        self.wait_for_at_least_or_cancel(threshold, &CancellationToken::new())
            .await
    }

    /// Like [`Workload::wait_for_at_least`], but returns `Cancelled` once
    /// `cancel` fires
    pub async fn wait_for_at_least_or_cancel(
        &self,
        threshold: usize,
        cancel: &CancellationToken,
    ) -> WorkloadResult<usize> {
        info!("waiting for {threshold} results to be produced");

        loop {
            let max = self.max_series_len().await;
            if max >= threshold {
                return Ok(max);
            }

            debug!("still have {max} < {threshold} results - waiting");

            tokio::select! {
                _ = cancel.cancelled() => return Err(WorkloadError::Cancelled(max)),
                _ = tokio::time::sleep(self.inner.config.tick()) => {}
            }
        }
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Counters of the current (or last) run
    pub async fn stats(&self) -> RunStats {
        self.inner.state.lock().await.counters.snapshot()
    }

    /// Sample counts per target and operation
    pub async fn results(&self) -> ResultSet {
        let state = self.inner.state.lock().await;
        let store = self.inner.store.read().await;

        let mut result = ResultSet::new(["target", "operation", "count"]);
        for operation in AccessMode::ALL {
            for target in state.registry.iter() {
                result.push(vec![
                    Value::from(target.id.as_str()),
                    Value::from(operation.as_str()),
                    Value::from(store.len(&target.id, operation)),
                ]);
            }
        }
        result
    }

    /// Raw `(timestamp, duration)` rows of one series
    pub async fn results_for(&self, target_id: &str, operation: &str) -> WorkloadResult<ResultSet> {
        let series = self.series_for(target_id, operation).await?;

        let mut result = ResultSet::new(["timestamp", "duration"]);
        for sample in series.samples {
            result.push(vec![
                Value::Integer(sample.timestamp),
                Value::Integer(sample.duration),
            ]);
        }
        Ok(result)
    }

    pub async fn series_for(&self, target_id: &str, operation: &str) -> WorkloadResult<Series> {
        let operation: AccessMode = operation.parse()?;
        Ok(self.inner.store.read().await.for_target(target_id, operation))
    }

    pub async fn counts_for(&self, target_id: &str, operation: &str) -> WorkloadResult<usize> {
        let operation: AccessMode = operation.parse()?;
        Ok(self.inner.store.read().await.len(target_id, operation))
    }

    /// Dense gap-filled table over all registered targets
    pub async fn results_table(&self) -> WorkloadResult<ResultSet> {
        let state = self.inner.state.lock().await;
        let store = self.inner.store.read().await;
        build_table(&store, state.registry.iter().map(|t| t.id.as_str()))
    }

    /// Name, address, running flag and sample counts of the given targets
    pub async fn targets_summary(&self, targets: &[Target]) -> ResultSet {
        let store = self.inner.store.read().await;

        let mut result = ResultSet::new(["name", "address", "running", "read", "write"]);
        for target in targets {
            result.push(vec![
                Value::from(target.id.as_str()),
                Value::from(target.address.as_str()),
                Value::from(target.is_running()),
                Value::from(store.len(&target.id, AccessMode::Read)),
                Value::from(store.len(&target.id, AccessMode::Write)),
            ]);
        }
        result
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn max_series_len(&self) -> usize {
        let state = self.inner.state.lock().await;
        let guard = self.inner.store.read().await;
        let store = &*guard;

        state
            .registry
            .iter()
            .flat_map(|target| {
                AccessMode::ALL
                    .into_iter()
                    .map(move |operation| store.len(&target.id, operation))
            })
            .max()
            .unwrap_or(0)
    }

    /// Idempotently create the benchmark node on a target
    async fn init_model(&self, target: &Target) -> WorkloadResult<()> {
        let session = self.inner.factory.connect(target, AccessMode::Write).await?;
        let result = session.run_query(AccessMode::Write, MODEL_QUERY).await;

        if let Err(e) = session.close().await {
            warn!("failed to close model session for '{}': {e}", target.id);
        }

        let rows = result?.len();
        if rows != EXPECTED_ROWS {
            return Err(WorkloadError::Query(format!(
                "expected exactly one 'ClientBenchmark' node on '{}' but found {rows}",
                target.id
            )));
        }

        Ok(())
    }
}
