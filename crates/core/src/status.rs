//! Canonical task status and remote-vocabulary normalization.
//!
//! Each remote engine reports task state with its own strings and casing.
//! [`normalize_remote_status`] maps all observed vendor vocabulary onto the
//! five canonical states exactly once, at the adapter boundary, so no other
//! consumer ever compares raw status strings.

use serde::{Deserialize, Serialize};

/// Canonical lifecycle state of a task.
///
/// `Pending` and `Running` may alternate while the task is queued and
/// re-queued remotely; the three remaining states are terminal and, once
/// reached, immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Whether this status ends the task's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Map a raw engine status string onto the canonical enum.
///
/// Matching is case-insensitive. Unrecognized strings map to `Running`
/// rather than erroring: transient unknown states are expected from both
/// engines and must not abort a poll loop. A permanently misreporting
/// engine is therefore only caught by the poll attempt budget.
pub fn normalize_remote_status(raw: &str) -> TaskStatus {
    match raw.trim().to_ascii_uppercase().as_str() {
        "QUEUED" | "PENDING" | "WAITING" | "CREATED" => TaskStatus::Pending,
        "RUNNING" | "PROCESSING" | "STARTED" => TaskStatus::Running,
        "SUCCESS" | "SUCCEEDED" | "COMPLETED" | "FINISHED" => TaskStatus::Succeeded,
        "FAILED" | "ERROR" => TaskStatus::Failed,
        "CANCELED" | "CANCELLED" | "ABORTED" => TaskStatus::Cancelled,
        _ => TaskStatus::Running,
    }
}
