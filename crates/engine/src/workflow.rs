//! REST adapter for the direct-workflow engine.
//!
//! Wraps the remote service's raw workflow API (`/openapi/task/*`) using
//! [`reqwest`]. Responses arrive in a `{ code, msg, data }` envelope;
//! `code == 0` is success and anything else is a remote-side rejection.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use glint_core::template::ResolvedField;
use glint_core::types::{EngineKind, TaskId};

use crate::adapter::{Engine, EngineError, StatusReport};
use crate::endpoints::RegionMap;
use crate::result::{normalize_artifacts, ArtifactRef, RawArtifact};

/// Remote code meaning the task already reached a terminal state.
/// Returned by cancel calls that arrive too late; not an error for a
/// best-effort cancel.
const CODE_TASK_FINISHED: i64 = 804;

/// HTTP client for the direct-workflow API.
pub struct WorkflowEngine {
    client: reqwest::Client,
    regions: Arc<RegionMap>,
    api_key: String,
}

/// Response envelope of the workflow API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

/// Payload of a successful task creation.
#[derive(Debug, Deserialize)]
struct CreatedTask {
    #[serde(rename = "taskId")]
    task_id: String,
}

impl WorkflowEngine {
    /// Create an adapter reusing an existing [`reqwest::Client`] so both
    /// engine adapters share one connection pool.
    pub fn new(client: reqwest::Client, regions: Arc<RegionMap>, api_key: String) -> Self {
        Self {
            client,
            regions,
            api_key,
        }
    }

    /// POST a JSON body to `{base}{path}` and decode the envelope payload.
    async fn post<T: DeserializeOwned>(
        &self,
        region: &str,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, EngineError> {
        let envelope = self.post_envelope::<T>(region, path, body).await?;
        envelope
            .data
            .ok_or_else(|| EngineError::Unavailable("response envelope carried no data".into()))
    }

    async fn post_envelope<T: DeserializeOwned>(
        &self,
        region: &str,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Envelope<T>, EngineError> {
        let base = self.regions.base_url(region)?;
        let response = self
            .client
            .post(format!("{base}{path}"))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EngineError::Unavailable(format!(
                "HTTP {status}: {body}",
                status = status.as_u16()
            )));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| EngineError::Unavailable(format!("invalid response body: {e}")))?;

        if envelope.code != 0 {
            return Err(EngineError::Rejected {
                code: envelope.code,
                message: envelope.msg.clone(),
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl Engine for WorkflowEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::DirectWorkflow
    }

    async fn start(
        &self,
        region: &str,
        identifier: &str,
        invocation: &[ResolvedField],
    ) -> Result<TaskId, EngineError> {
        let body = serde_json::json!({
            "apiKey": self.api_key,
            "workflowId": identifier,
            "clientId": uuid::Uuid::new_v4().to_string(),
            "nodeInfoList": invocation,
        });

        let created: CreatedTask = self.post(region, "/openapi/task/create", &body).await?;

        tracing::info!(
            workflow_id = identifier,
            task_id = %created.task_id,
            region,
            "Workflow task created",
        );
        Ok(created.task_id)
    }

    async fn status(&self, region: &str, task_id: &str) -> Result<StatusReport, EngineError> {
        let body = serde_json::json!({ "apiKey": self.api_key, "taskId": task_id });

        // The workflow API reports status as a bare string in `data`.
        let raw: String = self.post(region, "/openapi/task/status", &body).await?;
        Ok(StatusReport::from_raw(raw))
    }

    async fn result(&self, region: &str, task_id: &str) -> Result<Vec<ArtifactRef>, EngineError> {
        let body = serde_json::json!({ "apiKey": self.api_key, "taskId": task_id });

        let raw: Vec<RawArtifact> = self.post(region, "/openapi/task/outputs", &body).await?;
        Ok(normalize_artifacts(raw))
    }

    async fn cancel(&self, region: &str, task_id: &str) -> Result<(), EngineError> {
        let body = serde_json::json!({ "apiKey": self.api_key, "taskId": task_id });

        match self
            .post_envelope::<serde_json::Value>(region, "/openapi/task/cancel", &body)
            .await
        {
            Ok(_) => Ok(()),
            // The task finished before the cancel arrived.
            Err(EngineError::Rejected { code, .. }) if code == CODE_TASK_FINISHED => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::status::TaskStatus;

    #[test]
    fn envelope_decodes_created_task() {
        let json = r#"{"code":0,"msg":"success","data":{"taskId":"t-901"}}"#;
        let envelope: Envelope<CreatedTask> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.data.unwrap().task_id, "t-901");
    }

    #[test]
    fn envelope_decodes_bare_status_string() {
        let json = r#"{"code":0,"msg":"success","data":"RUNNING"}"#;
        let envelope: Envelope<String> = serde_json::from_str(json).unwrap();
        let report = StatusReport::from_raw(envelope.data.unwrap());
        assert_eq!(report.status, TaskStatus::Running);
    }

    #[test]
    fn envelope_tolerates_missing_msg() {
        let json = r#"{"code":421,"data":null}"#;
        let envelope: Envelope<CreatedTask> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 421);
        assert_eq!(envelope.msg, "");
    }

    #[test]
    fn envelope_decodes_output_list() {
        let json = r#"{"code":0,"msg":"ok","data":["a.jpg",{"fileUrl":"b.jpg"}]}"#;
        let envelope: Envelope<Vec<RawArtifact>> = serde_json::from_str(json).unwrap();
        let refs = normalize_artifacts(envelope.data.unwrap());
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].as_str(), "a.jpg");
        assert_eq!(refs[1].as_str(), "b.jpg");
    }
}
