//! Timer-driven status polling loop.
//!
//! One poller runs per task. Each tick queries status through the fallback
//! coordinator, so a task started on one engine can still be tracked if
//! the other engine ends up answering. Ticks are strictly sequential:
//! the next query is only scheduled after the previous response (or
//! error) is fully processed, and results are fetched at most once, on
//! the first observed `Succeeded`.

use std::sync::Arc;
use std::time::Duration;

use glint_core::progress::poll_progress;
use glint_core::status::TaskStatus;
use glint_engine::fallback::FallbackCoordinator;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::events::TaskEvent;
use crate::registry::TaskCell;

/// Tunable polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Delay between consecutive status queries.
    pub interval: Duration,
    /// Budget of status queries before the task is declared timed out.
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// Why a poller stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Terminal success with fetched artifacts.
    Succeeded,
    /// Remote failure, unfetchable results, or empty results.
    Failed(PollFailure),
    /// Cancelled locally (or the remote reported cancellation).
    Cancelled,
    /// Attempt budget exhausted without ever observing a terminal state.
    TimedOut,
}

/// Distinct failure reasons a poller can surface.
///
/// A timeout is deliberately distinguishable from a remote-reported
/// failure, and a success with unfetchable or empty results is a failure,
/// never reported as success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollFailure {
    #[error("processing timeout after {attempts} status checks")]
    ProcessingTimeout { attempts: u32 },

    #[error("engine reported failure (status '{raw}')")]
    RemoteFailed { raw: String },

    #[error("task succeeded but produced no artifacts")]
    NoArtifactsProduced,

    #[error("failed to fetch results: {0}")]
    ResultFetch(String),
}

/// Poll a task to a terminal state, updating its cell and emitting events.
///
/// Transient query errors (a single flaky poll, even across both engines)
/// are absorbed: they count against the attempt budget but do not fail
/// the task. Only exhausting the budget without a terminal observation
/// times the task out.
pub async fn run_poller(
    engines: Arc<FallbackCoordinator>,
    cell: Arc<TaskCell>,
    config: PollerConfig,
    cancel: CancellationToken,
    events: broadcast::Sender<TaskEvent>,
) -> PollOutcome {
    let task_id = cell.task_id().to_string();
    let mut attempt: u32 = 0;

    loop {
        if attempt >= config.max_attempts {
            let failure = PollFailure::ProcessingTimeout { attempts: attempt };
            tracing::warn!(task_id = %task_id, attempts = attempt, "Task timed out");
            if cell
                .finish(TaskStatus::Failed, Vec::new(), Some(failure.to_string()))
                .await
            {
                let _ = events.send(TaskEvent::Failed {
                    task_id,
                    error: failure.to_string(),
                });
            }
            return PollOutcome::TimedOut;
        }
        attempt += 1;

        let queried = tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = engines.status(cell.engine(), cell.region(), &task_id) => result,
        };

        match queried {
            Ok(served) => match served.value.status {
                TaskStatus::Pending | TaskStatus::Running => {
                    let progress = poll_progress(attempt, config.max_attempts);
                    if !cell.note_progress(served.value.status, progress).await {
                        // Latched terminal locally while the query was in
                        // flight; discard the late response.
                        return PollOutcome::Cancelled;
                    }
                    let _ = events.send(TaskEvent::Progress {
                        task_id: task_id.clone(),
                        status: served.value.status,
                        progress,
                    });
                }
                TaskStatus::Succeeded => {
                    return fetch_results(&engines, &cell, &events, task_id).await;
                }
                TaskStatus::Failed => {
                    let failure = PollFailure::RemoteFailed {
                        raw: served.value.raw,
                    };
                    if cell
                        .finish(TaskStatus::Failed, Vec::new(), Some(failure.to_string()))
                        .await
                    {
                        let _ = events.send(TaskEvent::Failed {
                            task_id,
                            error: failure.to_string(),
                        });
                    }
                    return PollOutcome::Failed(failure);
                }
                TaskStatus::Cancelled => {
                    if cell.finish(TaskStatus::Cancelled, Vec::new(), None).await {
                        let _ = events.send(TaskEvent::Cancelled { task_id });
                    }
                    return PollOutcome::Cancelled;
                }
            },
            Err(e) => {
                // Single flaky poll: absorbed, counted, loop continues.
                tracing::warn!(
                    task_id = %task_id,
                    attempt,
                    error = %e,
                    "Transient status query failure",
                );
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

/// Fetch and latch results after the first observed `Succeeded`.
async fn fetch_results(
    engines: &FallbackCoordinator,
    cell: &TaskCell,
    events: &broadcast::Sender<TaskEvent>,
    task_id: String,
) -> PollOutcome {
    let failure = match engines
        .result(cell.engine(), cell.region(), &task_id)
        .await
    {
        Ok(served) if served.value.is_empty() => PollFailure::NoArtifactsProduced,
        Ok(served) => {
            tracing::info!(
                task_id = %task_id,
                engine = %served.engine,
                artifacts = served.value.len(),
                "Task succeeded",
            );
            if cell
                .finish(TaskStatus::Succeeded, served.value.clone(), None)
                .await
            {
                let _ = events.send(TaskEvent::Completed {
                    task_id,
                    artifacts: served.value,
                });
            }
            return PollOutcome::Succeeded;
        }
        Err(e) => PollFailure::ResultFetch(e.to_string()),
    };

    // A Succeeded status with unfetchable or empty results is a failure.
    if cell
        .finish(TaskStatus::Failed, Vec::new(), Some(failure.to_string()))
        .await
    {
        let _ = events.send(TaskEvent::Failed {
            task_id,
            error: failure.to_string(),
        });
    }
    PollOutcome::Failed(failure)
}
