//! Effect descriptors and engine selection.

use serde::{Deserialize, Serialize};

use crate::template::TemplateEntry;
use crate::types::EngineKind;

/// Declarative description of one AI effect.
///
/// Carries exactly one engine identifier -- a workflow id for the
/// direct-workflow engine or a webapp id for the packaged-application
/// engine -- plus the parameter template that maps the engine's input slots
/// to submission values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webapp_id: Option<String>,
    #[serde(default)]
    pub template: Vec<TemplateEntry>,
}

/// Errors from effect descriptor validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// Zero or both engine identifiers were supplied; the engine to run on
    /// cannot be determined.
    #[error("effect must carry exactly one of workflowId or webappId")]
    AmbiguousEngineSelection,
}

impl EffectDescriptor {
    /// Determine the engine this effect runs on, with its identifier.
    ///
    /// Exactly one of `workflow_id`/`webapp_id` must be present; empty
    /// strings count as absent.
    pub fn engine_selection(&self) -> Result<(EngineKind, &str), EffectError> {
        let workflow = self.workflow_id.as_deref().filter(|s| !s.is_empty());
        let webapp = self.webapp_id.as_deref().filter(|s| !s.is_empty());

        match (workflow, webapp) {
            (Some(id), None) => Ok((EngineKind::DirectWorkflow, id)),
            (None, Some(id)) => Ok((EngineKind::PackagedApplication, id)),
            _ => Err(EffectError::AmbiguousEngineSelection),
        }
    }
}
