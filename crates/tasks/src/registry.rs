//! Task registry and per-task state cells.
//!
//! Each submitted task owns one [`TaskCell`] (its observable state) and
//! one poller task, tracked together in the [`TaskRegistry`]. The cell's
//! terminal state is a write-once latch: once a task is `Succeeded`,
//! `Failed`, or `Cancelled`, no later poll response can overwrite it --
//! this is what guards the race between local cancellation and a
//! late-arriving remote status.

use std::collections::HashMap;
use std::sync::Arc;

use glint_core::status::TaskStatus;
use glint_core::types::{EngineKind, TaskId, Timestamp};
use glint_engine::result::ArtifactRef;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::poller::PollOutcome;

/// Point-in-time view of one task, as returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub engine: EngineKind,
    pub region: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub results: Vec<ArtifactRef>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

/// Mutable task state shared between the poller and request handlers.
pub struct TaskCell {
    task_id: TaskId,
    engine: EngineKind,
    region: String,
    state: RwLock<CellState>,
}

struct CellState {
    status: TaskStatus,
    progress: u8,
    results: Vec<ArtifactRef>,
    error: Option<String>,
    created_at: Timestamp,
    finished_at: Option<Timestamp>,
}

impl TaskCell {
    pub fn new(task_id: TaskId, engine: EngineKind, region: String) -> Self {
        Self {
            task_id,
            engine,
            region,
            state: RwLock::new(CellState {
                status: TaskStatus::Pending,
                progress: 0,
                results: Vec::new(),
                error: None,
                created_at: chrono::Utc::now(),
                finished_at: None,
            }),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub async fn snapshot(&self) -> TaskSnapshot {
        let state = self.state.read().await;
        TaskSnapshot {
            task_id: self.task_id.clone(),
            engine: self.engine,
            region: self.region.clone(),
            status: state.status,
            progress: state.progress,
            results: state.results.clone(),
            error: state.error.clone(),
            created_at: state.created_at,
            finished_at: state.finished_at,
        }
    }

    /// Record a non-terminal status and advisory progress.
    ///
    /// Returns `false` without modifying anything if the task already
    /// reached a terminal state (e.g. was cancelled locally while the
    /// status query was in flight).
    pub async fn note_progress(&self, status: TaskStatus, progress: u8) -> bool {
        debug_assert!(!status.is_terminal());
        let mut state = self.state.write().await;
        if state.status.is_terminal() {
            return false;
        }
        state.status = status;
        state.progress = progress;
        true
    }

    /// Latch a terminal state.
    ///
    /// The first terminal transition wins; any later attempt returns
    /// `false` and is discarded by the caller. A successful finish also
    /// pins progress to 100.
    pub async fn finish(
        &self,
        status: TaskStatus,
        results: Vec<ArtifactRef>,
        error: Option<String>,
    ) -> bool {
        debug_assert!(status.is_terminal());
        let mut state = self.state.write().await;
        if state.status.is_terminal() {
            return false;
        }
        state.status = status;
        state.results = results;
        state.error = error;
        state.finished_at = Some(chrono::Utc::now());
        if status == TaskStatus::Succeeded {
            state.progress = 100;
        }
        true
    }
}

/// One registered task: its cell plus the handles that own its poller.
struct TaskEntry {
    cell: Arc<TaskCell>,
    cancel: CancellationToken,
    poller: tokio::task::JoinHandle<PollOutcome>,
}

/// All tasks known to this process, keyed by remote task id.
#[derive(Default)]
pub struct TaskRegistry {
    inner: RwLock<HashMap<TaskId, TaskEntry>>,
}

impl TaskRegistry {
    pub async fn insert(
        &self,
        cell: Arc<TaskCell>,
        cancel: CancellationToken,
        poller: tokio::task::JoinHandle<PollOutcome>,
    ) {
        let task_id = cell.task_id().to_string();
        self.inner.write().await.insert(
            task_id,
            TaskEntry {
                cell,
                cancel,
                poller,
            },
        );
    }

    /// The cell and cancellation token for a task, if registered.
    pub async fn get(&self, task_id: &str) -> Option<(Arc<TaskCell>, CancellationToken)> {
        let map = self.inner.read().await;
        map.get(task_id)
            .map(|entry| (Arc::clone(&entry.cell), entry.cancel.clone()))
    }

    pub async fn snapshot(&self, task_id: &str) -> Option<TaskSnapshot> {
        let cell = {
            let map = self.inner.read().await;
            map.get(task_id).map(|entry| Arc::clone(&entry.cell))
        };
        match cell {
            Some(cell) => Some(cell.snapshot().await),
            None => None,
        }
    }

    /// Stop every poller and wait briefly for each to exit.
    pub async fn shutdown(&self) {
        let mut map = self.inner.write().await;
        for (task_id, entry) in map.drain() {
            entry.cancel.cancel();
            if tokio::time::timeout(std::time::Duration::from_secs(5), entry.poller)
                .await
                .is_err()
            {
                tracing::warn!(task_id = %task_id, "Poller did not stop within timeout");
            }
        }
    }
}
