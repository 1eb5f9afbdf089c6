//! Platform events emitted by the task runtime.
//!
//! High-level state changes the rest of the platform cares about,
//! broadcast via a [`tokio::sync::broadcast`] channel. Subscribers (e.g.
//! a push transport towards the UI) receive them without polling the
//! registry.

use glint_core::status::TaskStatus;
use glint_core::types::TaskId;
use glint_engine::result::ArtifactRef;
use serde::Serialize;

/// A platform-level event for one task.
#[derive(Debug, Clone, Serialize)]
pub enum TaskEvent {
    /// The task is still in flight; advisory progress was recomputed.
    Progress {
        task_id: TaskId,
        status: TaskStatus,
        /// Advisory percentage (0-100), derived from poll attempts.
        progress: u8,
    },

    /// The task finished and its artifacts were fetched.
    Completed {
        task_id: TaskId,
        artifacts: Vec<ArtifactRef>,
    },

    /// The task failed: remote failure, timeout, or unfetchable results.
    Failed {
        task_id: TaskId,
        /// Human-readable failure reason.
        error: String,
    },

    /// The task was cancelled by the user.
    Cancelled { task_id: TaskId },
}
