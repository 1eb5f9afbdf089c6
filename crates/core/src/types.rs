//! Shared primitive types.

use serde::{Deserialize, Serialize};

/// Remote task identifiers are opaque strings assigned by the engines.
pub type TaskId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The two remote execution engines a task can run on.
///
/// Set once at submission time from which identifier the effect carries.
/// It selects the *preferred* adapter for all later calls; status, result
/// and cancel queries may still be answered by the other engine through
/// the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Raw workflow execution (`workflowId`).
    DirectWorkflow,
    /// Packaged application execution (`webappId`).
    PackagedApplication,
}

impl EngineKind {
    /// The alternate engine, used by the fallback coordinator.
    pub fn other(self) -> Self {
        match self {
            EngineKind::DirectWorkflow => EngineKind::PackagedApplication,
            EngineKind::PackagedApplication => EngineKind::DirectWorkflow,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::DirectWorkflow => write!(f, "direct-workflow"),
            EngineKind::PackagedApplication => write!(f, "packaged-application"),
        }
    }
}
