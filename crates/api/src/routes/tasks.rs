//! Route definitions and handlers for the `/tasks` resource.
//!
//! The wire shapes follow the platform contract: every response carries a
//! `success` flag, task status is one of the five canonical lowercase
//! strings, and results are a flat list of artifact URLs.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use glint_core::effect::EffectDescriptor;
use glint_core::status::TaskStatus;
use glint_engine::result::ArtifactRef;
use glint_engine::submit::Submission;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// POST   /                -> submit_task
/// GET    /{id}            -> get_task
/// GET    /{id}/results    -> get_results
/// POST   /{id}/cancel     -> cancel_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_task))
        .route("/{id}", get(get_task))
        .route("/{id}/results", get(get_results))
        .route("/{id}/cancel", post(cancel_task))
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskRequest {
    /// Effect descriptor: exactly one engine identifier plus the template.
    pub effect: EffectDescriptor,
    /// User-supplied parameters, keyed by template source keys.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// Uploaded file handles from the upload service.
    #[serde(default)]
    pub files: Vec<FileInput>,
    /// Region to run in; fixed for the task's lifetime.
    pub region: String,
}

/// One uploaded file: the template source key it fills and the opaque
/// handle the upload service returned for it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    pub key: String,
    pub file_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskResponse {
    pub success: bool,
    pub task_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub success: bool,
    pub status: TaskStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultsResponse {
    pub success: bool,
    pub results: Vec<ArtifactRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
///
/// Validates the submission, starts the task on the selected engine, and
/// registers a poller for it. Validation failures return 400 with every
/// missing input listed at once; engine failures return 502 naming the
/// attempted engine.
async fn submit_task(
    State(state): State<AppState>,
    Json(input): Json<SubmitTaskRequest>,
) -> AppResult<impl IntoResponse> {
    let submission = Submission {
        effect: input.effect,
        parameters: input.parameters,
        files: input
            .files
            .into_iter()
            .map(|f| (f.key, f.file_id))
            .collect(),
        region: input.region,
    };

    let task_id = state.tasks.submit(submission).await?;

    Ok(Json(SubmitTaskResponse {
        success: true,
        task_id,
    }))
}

/// GET /api/v1/tasks/{id}
///
/// Snapshot of the task's canonical status and advisory progress.
async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state
        .tasks
        .status(&task_id)
        .await
        .ok_or(AppError::NotFound {
            resource: "Task",
            id: task_id,
        })?;

    Ok(Json(TaskStatusResponse {
        success: true,
        status: snapshot.status,
        progress: snapshot.progress,
        error: snapshot.error,
    }))
}

/// GET /api/v1/tasks/{id}/results
///
/// The canonical ordered artifact list. Only available once the task has
/// succeeded; any other state is a 409.
async fn get_results(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state
        .tasks
        .status(&task_id)
        .await
        .ok_or(AppError::NotFound {
            resource: "Task",
            id: task_id,
        })?;

    if snapshot.status != TaskStatus::Succeeded {
        return Err(AppError::Conflict(format!(
            "task is {}, results are available after success",
            snapshot.status
        )));
    }

    Ok(Json(TaskResultsResponse {
        success: true,
        results: snapshot.results,
    }))
}

/// POST /api/v1/tasks/{id}/cancel
///
/// Stops polling and latches the task to cancelled immediately; the
/// remote cancel runs best-effort in the background. Always reports
/// success for a known task, whatever the remote outcome.
async fn cancel_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .tasks
        .cancel(&task_id)
        .await
        .ok_or(AppError::NotFound {
            resource: "Task",
            id: task_id,
        })?;

    Ok(Json(CancelResponse { success: true }))
}
