//! Dispatch router over the two engine adapters.
//!
//! Submission is not engine-agnostic: the effect's identifier decides which
//! adapter starts the task, and that choice is recorded on the task as its
//! preferred engine. The router holds both adapters behind the common
//! [`Engine`] trait so later status/result/cancel calls (and the fallback
//! coordinator) can address either one.

use std::sync::Arc;

use glint_core::template::ResolvedField;
use glint_core::types::{EngineKind, TaskId};

use crate::adapter::{Engine, EngineError};
use crate::endpoints::RegionMap;
use crate::webapp::WebAppEngine;
use crate::workflow::WorkflowEngine;

/// Holds one adapter per engine kind.
pub struct EngineRouter {
    workflow: Arc<dyn Engine>,
    webapp: Arc<dyn Engine>,
}

impl EngineRouter {
    /// Build a router from explicit adapters. Tests inject scripted
    /// engines here; production uses [`EngineRouter::with_rest_adapters`].
    pub fn new(workflow: Arc<dyn Engine>, webapp: Arc<dyn Engine>) -> Self {
        Self { workflow, webapp }
    }

    /// Build the production router: both REST adapters sharing one
    /// [`reqwest::Client`] connection pool and the same region table.
    pub fn with_rest_adapters(regions: RegionMap, api_key: String) -> Self {
        let client = reqwest::Client::new();
        let regions = Arc::new(regions);
        Self {
            workflow: Arc::new(WorkflowEngine::new(
                client.clone(),
                Arc::clone(&regions),
                api_key.clone(),
            )),
            webapp: Arc::new(WebAppEngine::new(client, regions, api_key)),
        }
    }

    /// The adapter for an engine kind.
    pub fn adapter(&self, kind: EngineKind) -> Arc<dyn Engine> {
        match kind {
            EngineKind::DirectWorkflow => Arc::clone(&self.workflow),
            EngineKind::PackagedApplication => Arc::clone(&self.webapp),
        }
    }

    /// Start a task on the engine selected at submission time.
    pub async fn start(
        &self,
        kind: EngineKind,
        region: &str,
        identifier: &str,
        invocation: &[ResolvedField],
    ) -> Result<TaskId, EngineError> {
        self.adapter(kind).start(region, identifier, invocation).await
    }
}
