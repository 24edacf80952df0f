/// Notification delivery
///
/// The engine hands status transitions to a `Notifier` and moves on:
/// delivery is best-effort and a failed send never stalls or fails a
/// monitoring cycle.
pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::MonitoredTarget;
use crate::monitoring::types::CheckOutcome;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),

    #[error("invalid notifier configuration: {0}")]
    InvalidConfiguration(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Delivery sink for status-change notifications
///
/// `target` is the pre-update snapshot of the record; `outcome` is the
/// probe result that caused the transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_status_change(
        &self,
        owner_id: i64,
        target: &MonitoredTarget,
        outcome: &CheckOutcome,
    ) -> Result<(), NotifierError>;
}

/// No-op notifier for headless runs and tests
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify_status_change(
        &self,
        owner_id: i64,
        target: &MonitoredTarget,
        outcome: &CheckOutcome,
    ) -> Result<(), NotifierError> {
        tracing::info!(
            owner_id,
            target = %target.uuid,
            endpoint = %target.endpoint,
            status = %outcome.status,
            "status transition (notifications disabled)"
        );
        Ok(())
    }
}
