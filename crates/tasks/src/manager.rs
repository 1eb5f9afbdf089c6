//! Task lifecycle manager.
//!
//! Created once at application startup and cloned into request handlers
//! as an `Arc`. Ties the pieces together: submission through the engine
//! router, one spawned poller per task tracked in the registry, immediate
//! local cancellation with detached best-effort remote cancel, and the
//! task event broadcast channel.

use std::sync::Arc;

use glint_core::status::TaskStatus;
use glint_core::types::TaskId;
use glint_engine::fallback::FallbackCoordinator;
use glint_engine::submit::{self, SubmitError, Submission};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::events::TaskEvent;
use crate::poller::{run_poller, PollerConfig};
use crate::registry::{TaskCell, TaskRegistry, TaskSnapshot};

/// Broadcast channel capacity for task events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns every task submitted through this process.
pub struct TaskManager {
    registry: TaskRegistry,
    engines: Arc<FallbackCoordinator>,
    poller: PollerConfig,
    event_tx: broadcast::Sender<TaskEvent>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
}

impl TaskManager {
    /// Build a manager over the given engines and polling configuration.
    ///
    /// Returns a shared handle that is safe to clone into Axum state.
    pub fn new(engines: FallbackCoordinator, poller: PollerConfig) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            registry: TaskRegistry::default(),
            engines: Arc::new(engines),
            poller,
            event_tx,
            cancel: CancellationToken::new(),
        })
    }

    /// Subscribe to task lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_tx.subscribe()
    }

    /// Validate and start a task, then begin polling it.
    ///
    /// The first status query is issued immediately by the spawned poller.
    /// Submission failures are returned without registering anything; a
    /// failed submission is retried only by explicit user action.
    pub async fn submit(&self, submission: Submission) -> Result<TaskId, SubmitError> {
        let (task_id, engine) = submit::submit(self.engines.router(), &submission).await?;

        let cell = Arc::new(TaskCell::new(
            task_id.clone(),
            engine,
            submission.region.clone(),
        ));
        let token = self.cancel.child_token();
        let poller = tokio::spawn(run_poller(
            Arc::clone(&self.engines),
            Arc::clone(&cell),
            self.poller,
            token.clone(),
            self.event_tx.clone(),
        ));

        self.registry.insert(cell, token, poller).await;
        Ok(task_id)
    }

    /// Current snapshot of a task, or `None` for an unknown id.
    pub async fn status(&self, task_id: &str) -> Option<TaskSnapshot> {
        self.registry.snapshot(task_id).await
    }

    /// Cancel a task.
    ///
    /// The local transition is immediate: the cell is latched to
    /// `Cancelled` and the poller stops before this returns. The remote
    /// cancel runs detached and best-effort; its outcome is logged but
    /// never re-applied to the task. Cancelling an already-terminal task
    /// is a no-op. Returns `None` for an unknown id.
    pub async fn cancel(&self, task_id: &str) -> Option<TaskSnapshot> {
        let (cell, token) = self.registry.get(task_id).await?;

        let latched = cell.finish(TaskStatus::Cancelled, Vec::new(), None).await;
        token.cancel();

        if latched {
            let _ = self.event_tx.send(TaskEvent::Cancelled {
                task_id: task_id.to_string(),
            });

            let engines = Arc::clone(&self.engines);
            let engine = cell.engine();
            let region = cell.region().to_string();
            let id = task_id.to_string();
            tokio::spawn(async move {
                match engines.cancel(engine, &region, &id).await {
                    Ok(served) => tracing::info!(
                        task_id = %id,
                        engine = %served.engine,
                        "Remote cancel acknowledged",
                    ),
                    Err(e) => tracing::warn!(
                        task_id = %id,
                        error = %e,
                        "Remote cancel failed; task stays cancelled locally",
                    ),
                }
            });
        }

        Some(cell.snapshot().await)
    }

    /// Stop all pollers and wait for them to exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down task manager");
        self.cancel.cancel();
        self.registry.shutdown().await;
        tracing::info!("Task manager shut down complete");
    }
}
