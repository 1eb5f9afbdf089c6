//! Cross-engine fallback for status, result, and cancel queries.
//!
//! Task identifiers are not reliably persisted with the engine that issued
//! them (a client may lose that association across reloads), and ids are
//! not guaranteed unique across engines. Queries therefore run against the
//! task's preferred engine first and, on any adapter-level error, are
//! retried once against the alternate engine before failure is surfaced.
//! Which engine actually answered is reported for diagnostics only --
//! callers must not depend on it.

use std::sync::Arc;

use futures::future::BoxFuture;
use glint_core::types::EngineKind;

use crate::adapter::{Engine, EngineError, StatusReport};
use crate::result::ArtifactRef;
use crate::router::EngineRouter;

/// A successful fallback-wrapped result, tagged with the engine that
/// served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served<T> {
    pub value: T,
    /// Diagnostics only; not part of the task's observable state.
    pub engine: EngineKind,
}

/// Both engines failed the same logical operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("both engines failed ({primary_kind}: {primary}; {secondary_kind}: {secondary})")]
pub struct BothEnginesFailed {
    pub primary_kind: EngineKind,
    pub primary: EngineError,
    pub secondary_kind: EngineKind,
    pub secondary: EngineError,
}

/// Wraps the router with cross-engine retry for engine-agnostic queries.
///
/// Stateless across tasks: every call is independent, and the only shared
/// data is the router's read-only adapter pair.
pub struct FallbackCoordinator {
    router: EngineRouter,
}

impl FallbackCoordinator {
    pub fn new(router: EngineRouter) -> Self {
        Self { router }
    }

    /// The underlying router, for submission (which never falls back).
    pub fn router(&self) -> &EngineRouter {
        &self.router
    }

    /// Query task status, preferring the submitting engine.
    pub async fn status(
        &self,
        preferred: EngineKind,
        region: &str,
        task_id: &str,
    ) -> Result<Served<StatusReport>, BothEnginesFailed> {
        let region = region.to_string();
        let task_id = task_id.to_string();
        self.with_fallback(preferred, move |engine| {
            let region = region.clone();
            let task_id = task_id.clone();
            Box::pin(async move { engine.status(&region, &task_id).await })
        })
        .await
    }

    /// Fetch a succeeded task's artifacts, preferring the submitting engine.
    pub async fn result(
        &self,
        preferred: EngineKind,
        region: &str,
        task_id: &str,
    ) -> Result<Served<Vec<ArtifactRef>>, BothEnginesFailed> {
        let region = region.to_string();
        let task_id = task_id.to_string();
        self.with_fallback(preferred, move |engine| {
            let region = region.clone();
            let task_id = task_id.clone();
            Box::pin(async move { engine.result(&region, &task_id).await })
        })
        .await
    }

    /// Best-effort remote cancel, preferring the submitting engine.
    pub async fn cancel(
        &self,
        preferred: EngineKind,
        region: &str,
        task_id: &str,
    ) -> Result<Served<()>, BothEnginesFailed> {
        let region = region.to_string();
        let task_id = task_id.to_string();
        self.with_fallback(preferred, move |engine| {
            let region = region.clone();
            let task_id = task_id.clone();
            Box::pin(async move { engine.cancel(&region, &task_id).await })
        })
        .await
    }

    /// Run the same logical operation against the preferred adapter, then
    /// the alternate on failure. Validation never reaches this path; every
    /// [`EngineError`] is adapter-level and thus fallback-eligible.
    async fn with_fallback<T, F>(
        &self,
        preferred: EngineKind,
        op: F,
    ) -> Result<Served<T>, BothEnginesFailed>
    where
        F: Fn(Arc<dyn Engine>) -> BoxFuture<'static, Result<T, EngineError>>,
    {
        match op(self.router.adapter(preferred)).await {
            Ok(value) => Ok(Served {
                value,
                engine: preferred,
            }),
            Err(primary) => {
                let alternate = preferred.other();
                tracing::warn!(
                    preferred = %preferred,
                    error = %primary,
                    "Preferred engine failed, trying alternate",
                );
                match op(self.router.adapter(alternate)).await {
                    Ok(value) => Ok(Served {
                        value,
                        engine: alternate,
                    }),
                    Err(secondary) => Err(BothEnginesFailed {
                        primary_kind: preferred,
                        primary,
                        secondary_kind: alternate,
                        secondary,
                    }),
                }
            }
        }
    }
}
