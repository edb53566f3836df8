//! Background jobs: the task worker draining the dispatcher queue and the
//! periodic announcement refresh.

use std::sync::Arc;
use std::time::Duration;
use summit_core::tasks::{
    TaskRequest, SEND_CONFIRMATION_EMAIL_TASK, SET_FEATURED_SPEAKER_TASK,
};
use summit_core::{ConferenceService, ConferenceId};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use uuid::Uuid;

/// Drains dispatched tasks until the sending side closes.
///
/// Failures are logged and dropped; delivery is at-least-once and a
/// derivation that fails here is rerun the next time the same speaker or
/// seat count changes.
pub async fn run_task_worker(
    service: Arc<ConferenceService>,
    mut tasks: UnboundedReceiver<TaskRequest>,
) {
    while let Some(task) = tasks.recv().await {
        handle_task(&service, task).await;
    }
    info!("task queue closed, worker exiting");
}

async fn handle_task(service: &ConferenceService, task: TaskRequest) {
    match task.target.as_str() {
        SET_FEATURED_SPEAKER_TASK => {
            let (Some(speaker), Some(conference)) = (
                task.param("speaker"),
                task.param("conference_id")
                    .and_then(|raw| raw.parse::<Uuid>().ok())
                    .map(ConferenceId::from_uuid),
            ) else {
                warn!(target = %task.target, "malformed task parameters, dropping");
                return;
            };
            if let Err(e) = service.derive_featured_speaker(speaker, conference).await {
                warn!(error = %e, speaker, "featured speaker derivation failed");
            }
        }
        SEND_CONFIRMATION_EMAIL_TASK => {
            // Mail delivery is handled outside this process; record the
            // request so a missing mail can be traced.
            info!(
                email = task.param("email").unwrap_or(""),
                conference = task.param("conference_name").unwrap_or(""),
                "confirmation email requested"
            );
        }
        other => warn!(target = %other, "unknown task target, dropping"),
    }
}

/// Recomputes the near-sold-out announcement on a fixed interval.
pub async fn run_announcement_refresh(service: Arc<ConferenceService>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        match service.refresh_announcement().await {
            Ok(message) if message.is_empty() => {
                tracing::debug!("announcement refresh: nothing nearly sold out");
            }
            Ok(message) => info!(%message, "announcement refreshed"),
            Err(e) => warn!(error = %e, "announcement refresh failed"),
        }
    }
}
