//! Task submission coordination.
//!
//! Validates a submission, resolves the effect's parameter template, and
//! issues the start call through the dispatch router. Validation failures
//! surface synchronously and are never retried; an engine failure is
//! wrapped with the engine kind that was attempted and left for the user
//! to retry explicitly -- the remote start may have partial side effects
//! (consumed quota), so blind auto-retry is unsafe.

use std::collections::HashMap;

use glint_core::effect::{EffectDescriptor, EffectError};
use glint_core::template::{self, ResolveError};
use glint_core::types::{EngineKind, TaskId};

use crate::adapter::EngineError;
use crate::router::EngineRouter;

/// One submission: an effect plus the values that fill its template.
#[derive(Debug, Clone)]
pub struct Submission {
    pub effect: EffectDescriptor,
    /// User-supplied parameters, keyed by the template's source keys.
    pub parameters: HashMap<String, serde_json::Value>,
    /// Uploaded file handles, keyed by the template's source keys. The
    /// handles come from the upload service; raw bytes never pass through
    /// this subsystem.
    pub files: HashMap<String, String>,
    /// Region key; fixed for the task's whole lifetime.
    pub region: String,
}

/// Submission failures.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Every effect consumes at least one image; a submission with no
    /// uploaded files is invalid regardless of template contents.
    #[error("at least one input file is required")]
    NoInputFiles,

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The selected engine refused or could not be reached. Carries the
    /// attempted engine kind for user-facing diagnostics.
    #[error("{engine} engine failed to start the task: {source}")]
    Engine {
        engine: EngineKind,
        source: EngineError,
    },
}

impl SubmitError {
    /// Whether this failure is a caller-side validation error (fixable by
    /// the user) rather than an engine-side one.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SubmitError::Engine { .. })
    }
}

/// Validate, resolve, and start a task. Returns the remote task id and the
/// engine it was started on.
pub async fn submit(
    router: &EngineRouter,
    submission: &Submission,
) -> Result<(TaskId, EngineKind), SubmitError> {
    if submission.files.is_empty() {
        return Err(SubmitError::NoInputFiles);
    }

    let (kind, identifier) = submission.effect.engine_selection()?;

    let invocation = template::resolve(
        &submission.effect.template,
        &submission.parameters,
        &submission.files,
    )?;

    let task_id = router
        .start(kind, &submission.region, identifier, &invocation)
        .await
        .map_err(|source| SubmitError::Engine {
            engine: kind,
            source,
        })?;

    tracing::info!(
        task_id = %task_id,
        engine = %kind,
        region = %submission.region,
        fields = invocation.len(),
        "Task submitted",
    );

    Ok((task_id, kind))
}
