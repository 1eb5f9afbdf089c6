//! REST adapter for the packaged-application engine.
//!
//! Wraps the remote service's packaged-application API (`/openapi/app/*`).
//! Structurally similar to the workflow API but not identical: the
//! envelope spells its error field `message` rather than `msg`, and status
//! arrives as an object with a `taskStatus` field rather than a bare
//! string.

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
const CODE_TASK_FINISHED: i64 = 804;

/// HTTP client for the packaged-application API.
pub struct WebAppEngine {
    client: reqwest::Client,
    regions: Arc<RegionMap>,
    api_key: String,
}

/// Response envelope of the packaged-application API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    #[serde(rename = "taskId")]
    task_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppStatus {
    task_status: String,
}

impl WebAppEngine {
    /// Create an adapter reusing an existing [`reqwest::Client`] so both
    /// engine adapters share one connection pool.
    pub fn new(client: reqwest::Client, regions: Arc<RegionMap>, api_key: String) -> Self {
        Self {
            client,
            regions,
            api_key,
        }
    }

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
                message: envelope.message.clone(),
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl Engine for WebAppEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::PackagedApplication
    }

    async fn start(
        &self,
        region: &str,
        identifier: &str,
        invocation: &[ResolvedField],
    ) -> Result<TaskId, EngineError> {
        let body = serde_json::json!({
            "apiKey": self.api_key,
            "webappId": identifier,
            "clientId": uuid::Uuid::new_v4().to_string(),
            "nodeInfoList": invocation,
        });

        let created: CreatedTask = self.post(region, "/openapi/app/run", &body).await?;

        tracing::info!(
            webapp_id = identifier,
            task_id = %created.task_id,
            region,
            "Packaged-application task created",
        );
        Ok(created.task_id)
    }

    async fn status(&self, region: &str, task_id: &str) -> Result<StatusReport, EngineError> {
        let body = serde_json::json!({ "apiKey": self.api_key, "taskId": task_id });

        let status: AppStatus = self.post(region, "/openapi/app/status", &body).await?;
        Ok(StatusReport::from_raw(status.task_status))
    }

    async fn result(&self, region: &str, task_id: &str) -> Result<Vec<ArtifactRef>, EngineError> {
        let body = serde_json::json!({ "apiKey": self.api_key, "taskId": task_id });

        let raw: Vec<RawArtifact> = self.post(region, "/openapi/app/outputs", &body).await?;
        Ok(normalize_artifacts(raw))
    }

    async fn cancel(&self, region: &str, task_id: &str) -> Result<(), EngineError> {
        let body = serde_json::json!({ "apiKey": self.api_key, "taskId": task_id });

        match self
            .post_envelope::<serde_json::Value>(region, "/openapi/app/cancel", &body)
            .await
        {
            Ok(_) => Ok(()),
            Err(EngineError::Rejected { code, .. }) if code == CODE_TASK_FINISHED => Ok(()),
            Err(e) => Err(e),
        }
    }
}
