//! Registry of database targets under load

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{AccessMode, ClientFactory, Credentials};
use crate::error::{WorkloadError, WorkloadResult};

/// A named database deployment
///
/// Clones share the running flag and the stop signal, so the copy handed to
/// the workers observes a stop issued through the registry.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: String,
    pub address: String,
    credentials: Credentials,
    state: Arc<TargetState>,
}

#[derive(Debug, Default)]
struct TargetState {
    running: AtomicBool,
    stop: Mutex<CancellationToken>,
}

impl Target {
    pub fn new(id: impl Into<String>, address: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            credentials,
            state: Arc::new(TargetState::default()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.state.running.store(running, Ordering::SeqCst);
    }

    /// Install a fresh stop signal tied to the given run and return it
    pub fn arm(&self, run: &CancellationToken) -> CancellationToken {
        let token = run.child_token();
        *self.lock_stop() = token.clone();
        token
    }

    /// Fire the stop signal without waiting for the workers
    pub fn signal_stop(&self) {
        self.lock_stop().cancel();
    }

    pub fn stop_signal(&self) -> CancellationToken {
        self.lock_stop().clone()
    }

    /// Clear the running flag after a stop, unless a newer run re-armed the target
    pub fn stand_down(&self) {
        let stop = self.lock_stop();
        if stop.is_cancelled() {
            self.set_running(false);
        }
    }

    /// Open a read session and verify the target answers
    pub async fn check(&self, factory: &dyn ClientFactory) -> WorkloadResult<()> {
        let session = factory
            .connect(self, AccessMode::Read)
            .await
            .map_err(|e| WorkloadError::connectivity(&self.id, e))?;

        let checked = session.check().await;

        if let Err(e) = session.close().await {
            warn!("failed to close check session for '{}': {e}", self.id);
        }

        checked.map_err(|e| match e {
            WorkloadError::Connectivity { .. } => e,
            other => WorkloadError::connectivity(&self.id, other),
        })
    }

    fn lock_stop(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.state.stop.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The set of monitored targets
///
/// Ids are not unique: adding the same id twice keeps both entries.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check connectivity, then append the target
    pub async fn add(&mut self, target: Target, factory: &dyn ClientFactory) -> WorkloadResult<()> {
        info!("adding target '{}' at {}", target.id, target.address);
        target.check(factory).await?;
        self.targets.push(target);
        Ok(())
    }

    /// Remove the first target carrying `id`.
    ///
    /// The last entry takes the removed slot. Workers of a running target
    /// keep going until the run is stopped or their error budget runs out.
    pub fn remove(&mut self, id: &str) -> WorkloadResult<Target> {
        info!("removing target '{id}'");
        match self.position(id) {
            Some(index) => Ok(self.targets.swap_remove(index)),
            None => {
                debug!("could not find target '{id}'");
                Err(WorkloadError::NotFound(id.to_string()))
            }
        }
    }

    /// The first target carrying `id`
    pub fn find(&self, id: &str) -> WorkloadResult<Target> {
        self.position(id)
            .map(|index| self.targets[index].clone())
            .ok_or_else(|| WorkloadError::NotFound(id.to_string()))
    }

    /// All targets sorted by id
    pub fn list(&self) -> Vec<Target> {
        debug!("listing {} targets", self.targets.len());
        let mut sorted = self.targets.clone();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        sorted
    }

    /// Targets in registration order (modulo removals)
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.targets.iter().position(|target| target.id == id)
    }
}
