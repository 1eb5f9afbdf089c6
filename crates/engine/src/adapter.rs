//! The common engine adapter contract.
//!
//! Both remote engines expose the same four operations with different wire
//! envelopes. The trait keeps the dispatch router and fallback coordinator
//! agnostic of which engine is behind a call.

use async_trait::async_trait;
use glint_core::status::TaskStatus;
use glint_core::template::ResolvedField;
use glint_core::types::{EngineKind, TaskId};

use crate::result::ArtifactRef;

/// Canonical status of a remote task, plus the raw vendor string it was
/// normalized from. The raw string is kept for diagnostics and failure
/// messages only; consumers branch on `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: TaskStatus,
    pub raw: String,
}

impl StatusReport {
    /// Normalize a raw vendor status string into a report.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            status: glint_core::status::normalize_remote_status(&raw),
            raw,
        }
    }
}

/// Errors from a single engine adapter call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Transport-level failure (connect, TLS, timeout) or an undecodable
    /// response body. The engine may simply be down.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with a well-formed error envelope.
    #[error("engine rejected the request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The requested region has no configured endpoint.
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Unavailable(err.to_string())
    }
}

/// One remote execution engine.
///
/// Every call takes the task's region key; implementations resolve it to a
/// regional endpoint and must not mix regions for the same task.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Which engine this adapter speaks to.
    fn kind(&self) -> EngineKind;

    /// Start a task from a resolved invocation. Returns the remote task id.
    async fn start(
        &self,
        region: &str,
        identifier: &str,
        invocation: &[ResolvedField],
    ) -> Result<TaskId, EngineError>;

    /// Query the current status of a task.
    async fn status(&self, region: &str, task_id: &str) -> Result<StatusReport, EngineError>;

    /// Fetch the artifacts of a succeeded task.
    async fn result(&self, region: &str, task_id: &str) -> Result<Vec<ArtifactRef>, EngineError>;

    /// Best-effort cancel. A task that already finished is not an error.
    async fn cancel(&self, region: &str, task_id: &str) -> Result<(), EngineError>;
}
