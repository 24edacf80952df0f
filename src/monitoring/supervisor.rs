use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::prober::Prober;
use super::transition::should_notify;
use super::types::CheckOutcome;
use crate::database::TargetStore;
use crate::database::models::{MonitoredTarget, OwnerStats};
use crate::error::EngineError;
use crate::notify::Notifier;
use crate::validation;

/// Wait before retrying when the store is unreachable mid-cycle
const STORE_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Lifecycle of one target's monitoring loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Handle to a running monitoring loop
struct MonitorHandle {
    cancel: watch::Sender<bool>,
    state: watch::Receiver<LoopState>,
    task: tokio::task::JoinHandle<()>,
}

type Registry = Arc<Mutex<HashMap<Uuid, MonitorHandle>>>;

/// Owns the set of active per-target monitoring loops
///
/// One tokio task per target: probe, aggregate, detect, notify, persist,
/// then sleep for the configured interval or until cancelled. The registry
/// mapping target id to loop handle is private to the supervisor; creation,
/// deletion, and startup resume all mutate it under the supervisor's lock.
pub struct MonitorSupervisor {
    store: Arc<dyn TargetStore>,
    notifier: Arc<dyn Notifier>,
    prober: Arc<Prober>,
    active: Registry,
}

impl MonitorSupervisor {
    pub fn new(
        store: Arc<dyn TargetStore>,
        notifier: Arc<dyn Notifier>,
        prober: Arc<Prober>,
    ) -> Self {
        Self {
            store,
            notifier,
            prober,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a new target and begin monitoring it
    ///
    /// Runs one synchronous probe before the record is persisted, so a
    /// target is never visible without a known status.
    pub async fn register_target(
        &self,
        owner_id: i64,
        endpoint: String,
        interval_seconds: u64,
    ) -> Result<MonitoredTarget, EngineError> {
        validation::validate_endpoint(&endpoint)?;
        validation::validate_interval(interval_seconds)?;

        if self.store.find_by_endpoint(owner_id, &endpoint).await?.is_some() {
            return Err(EngineError::DuplicateTarget);
        }

        let initial = self.prober.probe(&endpoint).await;
        let target = MonitoredTarget::new(owner_id, endpoint, interval_seconds, &initial);
        self.store.create(&target).await?;

        info!(
            owner_id,
            target = %target.uuid,
            endpoint = %target.endpoint,
            status = %target.status,
            "target registered"
        );

        self.start_monitoring(&target).await;
        Ok(target)
    }

    /// Start a monitoring loop for a persisted target
    pub async fn start_monitoring(&self, target: &MonitoredTarget) {
        let mut active = self.active.lock().await;
        if active.contains_key(&target.uuid) {
            debug!(target = %target.uuid, "monitoring loop already active");
            return;
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(LoopState::Starting);

        let task = tokio::spawn(run_loop(
            target.uuid,
            self.store.clone(),
            self.notifier.clone(),
            self.prober.clone(),
            self.active.clone(),
            cancel_rx,
            state_tx,
        ));

        active.insert(
            target.uuid,
            MonitorHandle {
                cancel: cancel_tx,
                state: state_rx,
                task,
            },
        );
    }

    /// Cancel a target's monitoring loop and wait for it to stop
    ///
    /// Idempotent. After this returns the loop has reached `Stopped`; at
    /// most one in-flight cycle may still have persisted before the stop.
    pub async fn stop_monitoring(&self, uuid: Uuid) {
        let handle = self.active.lock().await.remove(&uuid);
        let Some(handle) = handle else {
            debug!(target = %uuid, "no active monitoring loop to stop");
            return;
        };

        let _ = handle.cancel.send(true);
        if let Err(e) = handle.task.await {
            error!(target = %uuid, error = %e, "monitoring loop panicked");
        }
        debug!(target = %uuid, "monitoring loop stopped");
    }

    /// Delete a target and terminate its monitoring loop
    ///
    /// The record is removed first, so a cycle racing the deletion fails
    /// its persist with not-found instead of resurrecting the target.
    pub async fn delete_target(&self, uuid: Uuid, owner_id: i64) -> Result<(), EngineError> {
        if !self.store.delete(uuid, owner_id).await? {
            return Err(EngineError::TargetNotFound);
        }
        self.stop_monitoring(uuid).await;
        info!(owner_id, target = %uuid, "target deleted");
        Ok(())
    }

    /// Run one on-demand check outside the periodic loop
    ///
    /// Uses the same atomic counter path as the periodic cycle, so the two
    /// can land concurrently on one target without losing an update.
    pub async fn trigger_manual_check(
        &self,
        uuid: Uuid,
        owner_id: i64,
    ) -> Result<CheckOutcome, EngineError> {
        let Some(target) = self.store.get_for_owner(uuid, owner_id).await? else {
            return Err(EngineError::TargetNotFound);
        };

        let outcome = self.prober.probe(&target.endpoint).await;

        if !self.store.update_after_check(uuid, &outcome).await? {
            // Deleted while the probe was in flight
            return Err(EngineError::TargetNotFound);
        }

        if should_notify(target.status, outcome.status, target.notifications_enabled) {
            if let Err(e) = self
                .notifier
                .notify_status_change(target.owner_id, &target, &outcome)
                .await
            {
                warn!(target = %uuid, error = %e, "notification delivery failed");
            }
        }

        Ok(outcome)
    }

    /// Update owner-mutable settings (interval, notifications flag)
    ///
    /// The endpoint itself is immutable; the running loop picks the new
    /// settings up at the top of its next cycle.
    pub async fn update_target_settings(
        &self,
        uuid: Uuid,
        owner_id: i64,
        interval_seconds: Option<u64>,
        notifications_enabled: Option<bool>,
    ) -> Result<(), EngineError> {
        if interval_seconds.is_none() && notifications_enabled.is_none() {
            return Err(EngineError::EmptyUpdate);
        }
        if let Some(interval) = interval_seconds {
            validation::validate_interval(interval)?;
        }

        if !self
            .store
            .update_settings(uuid, owner_id, interval_seconds, notifications_enabled)
            .await?
        {
            return Err(EngineError::TargetNotFound);
        }
        Ok(())
    }

    /// Resume monitoring for every persisted target (process startup)
    ///
    /// Loops are seeded from the persisted counters and status; a restart
    /// never resets uptime history.
    pub async fn resume_all(&self) -> Result<usize, EngineError> {
        let targets = self.store.list_all().await?;
        let count = targets.len();

        for target in &targets {
            self.start_monitoring(target).await;
        }

        info!(count, "resumed monitoring for persisted targets");
        Ok(count)
    }

    /// Aggregate statistics over one owner's targets
    pub async fn owner_stats(&self, owner_id: i64) -> Result<OwnerStats, EngineError> {
        let targets = self.store.list_for_owner(owner_id).await?;
        Ok(OwnerStats::from_targets(&targets))
    }

    /// Current loop state for a target, if a loop is registered
    pub async fn loop_state(&self, uuid: Uuid) -> Option<LoopState> {
        let active = self.active.lock().await;
        active.get(&uuid).map(|h| *h.state.borrow())
    }

    /// Watch a target's loop state (tests and surrounding layers)
    pub async fn watch_state(&self, uuid: Uuid) -> Option<watch::Receiver<LoopState>> {
        let active = self.active.lock().await;
        active.get(&uuid).map(|h| h.state.clone())
    }

    /// Number of active monitoring loops
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Stop every active loop (process shutdown)
    pub async fn shutdown(&self) {
        let handles: Vec<(Uuid, MonitorHandle)> =
            self.active.lock().await.drain().collect();

        for (uuid, handle) in handles {
            let _ = handle.cancel.send(true);
            if let Err(e) = handle.task.await {
                error!(target = %uuid, error = %e, "monitoring loop panicked");
            }
        }
        info!("all monitoring loops stopped");
    }
}

/// One target's monitoring loop
///
/// Cycles are strictly sequential: the next probe never starts before this
/// cycle's persist and notification complete. The loop exits only through
/// cancellation or the disappearance of its record.
#[allow(clippy::too_many_arguments)]
async fn run_loop(
    uuid: Uuid,
    store: Arc<dyn TargetStore>,
    notifier: Arc<dyn Notifier>,
    prober: Arc<Prober>,
    active: Registry,
    mut cancel: watch::Receiver<bool>,
    state: watch::Sender<LoopState>,
) {
    let _ = state.send(LoopState::Running);

    loop {
        if *cancel.borrow() {
            break;
        }

        // Re-read the record each cycle: this is the defensive deletion
        // check and also picks up interval/notification updates.
        let target = match store.get(uuid).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                debug!(target = %uuid, "record gone, stopping monitoring loop");
                break;
            }
            Err(e) => {
                error!(target = %uuid, error = %e, "failed to load target, retrying");
                if wait_or_cancelled(STORE_RETRY_WAIT, &mut cancel).await {
                    break;
                }
                continue;
            }
        };

        let outcome = prober.probe(&target.endpoint).await;
        let notify_due =
            should_notify(target.status, outcome.status, target.notifications_enabled);

        let mut persisted = store.update_after_check(uuid, &outcome).await;
        if let Err(e) = &persisted {
            warn!(target = %uuid, error = %e, "persist failed, retrying once");
            persisted = store.update_after_check(uuid, &outcome).await;
        }

        match persisted {
            Ok(true) => {
                if notify_due {
                    if let Err(e) = notifier
                        .notify_status_change(target.owner_id, &target, &outcome)
                        .await
                    {
                        warn!(target = %uuid, error = %e, "notification delivery failed");
                    }
                }
            }
            Ok(false) => {
                debug!(target = %uuid, "record deleted mid-cycle, stopping loop");
                break;
            }
            Err(e) => {
                // One bad cycle must not stop future monitoring
                error!(target = %uuid, error = %e, "persist failed twice, skipping cycle");
            }
        }

        if wait_or_cancelled(Duration::from_secs(target.interval_seconds), &mut cancel).await {
            break;
        }
    }

    let _ = state.send(LoopState::Stopping);
    active.lock().await.remove(&uuid);
    let _ = state.send(LoopState::Stopped);
}

/// Sleep for `duration`, returning early with true when cancelled
async fn wait_or_cancelled(duration: Duration, cancel: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        changed = cancel.changed() => match changed {
            Ok(()) => *cancel.borrow(),
            // Sender dropped: supervisor is gone, stop the loop
            Err(_) => true,
        },
    }
}
