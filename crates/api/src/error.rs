use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use glint_engine::adapter::EngineError;
use glint_engine::submit::SubmitError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce the platform's standard
/// `{ "success": false, "error": ..., "code": ... }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A submission was rejected before or during the engine start call.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The requested resource does not exist.
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// The request is valid but the resource is in the wrong state.
    #[error("{0}")]
    Conflict(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Submit(submit) => classify_submit_error(submit),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        };

        let body = json!({
            "success": false,
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a submission failure onto an HTTP status and error code.
///
/// - Validation errors (missing inputs, ambiguous engine, unknown region)
///   are the caller's to fix: 400.
/// - Engine-side failures surface as 502 with the attempted engine named
///   in the message; they are retried only by explicit user action.
fn classify_submit_error(err: &SubmitError) -> (StatusCode, &'static str) {
    match err {
        SubmitError::NoInputFiles | SubmitError::Effect(_) | SubmitError::Resolve(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        }
        SubmitError::Engine {
            source: EngineError::UnknownRegion(_),
            ..
        } => (StatusCode::BAD_REQUEST, "UNKNOWN_REGION"),
        SubmitError::Engine { .. } => (StatusCode::BAD_GATEWAY, "ENGINE_ERROR"),
    }
}
