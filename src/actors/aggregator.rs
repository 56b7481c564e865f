//! AggregatorActor - Funnels worker messages into the metric store
//!
//! Exactly one aggregator runs per workload run and it is the only writer of
//! the [`MetricStore`]. Samples are appended in the order they are received;
//! error messages are logged and counted but never stored.
//!
//! The actor exits when the run's stop signal fires, when the global running
//! flag drops, or when every worker has hung up. Messages still queued at
//! that point are discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::store::MetricStore;

use super::messages::{MessageKind, RunCounters, WorkloadMessage};

pub struct AggregatorActor {
    message_rx: mpsc::Receiver<WorkloadMessage>,
    store: Arc<RwLock<MetricStore>>,
    counters: Arc<RunCounters>,
    running: Arc<AtomicBool>,
    stop: CancellationToken,
}

impl AggregatorActor {
    pub fn new(
        message_rx: mpsc::Receiver<WorkloadMessage>,
        store: Arc<RwLock<MetricStore>>,
        counters: Arc<RunCounters>,
        running: Arc<AtomicBool>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            message_rx,
            store,
            counters,
            running,
            stop,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting aggregator");

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                biased;

                _ = self.stop.cancelled() => {
                    debug!("notified that the workload is finished");
                    break;
                }

                message = self.message_rx.recv() => {
                    match message {
                        Some(message) => self.handle(message).await,
                        None => {
                            debug!("all workers hung up");
                            break;
                        }
                    }
                }
            }
        }

        debug!("aggregator stopped");
    }

    async fn handle(&self, message: WorkloadMessage) {
        trace!(
            "got message '{}' for '{}': {}",
            message.kind, message.target_id, message.value
        );

        self.counters.record(message.kind);

        match message.kind {
            MessageKind::Sample(operation) => {
                self.store
                    .write()
                    .await
                    .add(operation, &message.target_id, message.value);
            }
            MessageKind::Error(_) | MessageKind::ModelError => {
                warn!(
                    "'{}' reported {} (value={})",
                    message.target_id, message.kind, message.value
                );
            }
        }
    }
}
