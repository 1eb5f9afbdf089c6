//! Integration tests for the `/api/v1/tasks` endpoints.
//!
//! Drive the full router (middleware included) over scripted engines:
//! submission validation, the polling lifecycle through to results, and
//! cancellation semantics.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use glint_engine::adapter::{EngineError, StatusReport};
use glint_engine::result::ArtifactRef;
use glint_tasks::events::TaskEvent;
use serde_json::json;

/// A submission for a one-image workflow effect.
fn submit_body() -> serde_json::Value {
    json!({
        "effect": {
            "workflowId": "123",
            "template": [
                {"slotId": "39", "fieldName": "image", "kind": "file", "sourceKey": "file1"}
            ]
        },
        "parameters": {},
        "files": [{"key": "file1", "fileId": "fh-8812"}],
        "region": "us"
    })
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_returns_task_id() {
    let test_app = build_test_app();
    test_app.workflow.queue_start(Ok("t-1".to_string()));

    let response = post_json(test_app.app, "/api/v1/tasks", submit_body()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["taskId"], "t-1");

    // The engine received the resolved invocation, not the template.
    let call = test_app.workflow.last_start().unwrap();
    assert_eq!(call.identifier, "123");
    assert_eq!(call.invocation[0].field_value, "fh-8812");
}

#[tokio::test]
async fn submit_without_files_is_rejected() {
    let test_app = build_test_app();

    let mut body = submit_body();
    body["files"] = json!([]);

    let response = post_json(test_app.app, "/api/v1/tasks", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(test_app.workflow.start_calls(), 0);
}

#[tokio::test]
async fn submit_with_wrong_file_key_names_missing_input() {
    let test_app = build_test_app();

    let mut body = submit_body();
    body["files"] = json!([{"key": "other", "fileId": "fh-1"}]);

    let response = post_json(test_app.app, "/api/v1/tasks", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(
        json["error"].as_str().unwrap().contains("file1"),
        "error must list the missing source key: {json}"
    );
}

#[tokio::test]
async fn submit_with_both_engine_ids_is_ambiguous() {
    let test_app = build_test_app();

    let mut body = submit_body();
    body["effect"]["webappId"] = json!("app-9");

    let response = post_json(test_app.app, "/api/v1/tasks", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn submit_engine_failure_names_attempted_engine() {
    let test_app = build_test_app();
    test_app
        .workflow
        .queue_start(Err(EngineError::Unavailable("connection refused".into())));

    let response = post_json(test_app.app, "/api/v1/tasks", submit_body()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ENGINE_ERROR");
    assert!(
        json["error"].as_str().unwrap().contains("direct-workflow"),
        "diagnostics must name the attempted engine: {json}"
    );
}

// ---------------------------------------------------------------------------
// Status & results lifecycle
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn task_lifecycle_reaches_results() {
    let test_app = build_test_app();
    test_app.workflow.queue_start(Ok("t-1".to_string()));
    test_app
        .workflow
        .queue_status(Ok(StatusReport::from_raw("RUNNING")));
    test_app
        .workflow
        .queue_status(Ok(StatusReport::from_raw("SUCCESS")));
    test_app
        .workflow
        .queue_outputs(Ok(vec![ArtifactRef("a.jpg".into())]));

    let mut events = test_app.tasks.subscribe();
    let response = post_json(test_app.app.clone(), "/api/v1/tasks", submit_body()).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Wait for the poller to finish.
    loop {
        if let TaskEvent::Completed { .. } = events.recv().await.unwrap() {
            break;
        }
    }

    let response = get(test_app.app.clone(), "/api/v1/tasks/t-1").await;
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["progress"], 100);

    let response = get(test_app.app, "/api/v1/tasks/t-1/results").await;
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["results"], json!(["a.jpg"]));
}

#[tokio::test(start_paused = true)]
async fn results_before_success_conflict() {
    let test_app = build_test_app();
    test_app.workflow.queue_start(Ok("t-1".to_string()));
    // Statuses default to Pending: the task stays in flight.

    post_json(test_app.app.clone(), "/api/v1/tasks", submit_body()).await;

    let response = get(test_app.app, "/api/v1/tasks/t-1/results").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn unknown_task_returns_404() {
    let test_app = build_test_app();

    let response = get(test_app.app, "/api/v1/tasks/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancel_reports_success_and_latches() {
    let test_app = build_test_app();
    test_app.workflow.queue_start(Ok("t-1".to_string()));

    post_json(test_app.app.clone(), "/api/v1/tasks", submit_body()).await;

    let response = post_json(test_app.app.clone(), "/api/v1/tasks/t-1/cancel", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    // A remote success arriving after cancellation changes nothing.
    test_app
        .workflow
        .queue_status(Ok(StatusReport::from_raw("SUCCESS")));
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;

    let response = get(test_app.app, "/api/v1/tasks/t-1").await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "cancelled");
}

#[tokio::test(start_paused = true)]
async fn cancel_twice_stays_successful() {
    let test_app = build_test_app();
    test_app.workflow.queue_start(Ok("t-1".to_string()));

    post_json(test_app.app.clone(), "/api/v1/tasks", submit_body()).await;

    let first = post_json(test_app.app.clone(), "/api/v1/tasks/t-1/cancel", json!({})).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_json(test_app.app, "/api/v1/tasks/t-1/cancel", json!({})).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["success"], true);
}

#[tokio::test]
async fn cancel_unknown_task_returns_404() {
    let test_app = build_test_app();

    let response = post_json(test_app.app, "/api/v1/tasks/nope/cancel", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
