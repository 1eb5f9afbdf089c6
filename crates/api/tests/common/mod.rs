//! Shared helpers for API integration tests.
//!
//! Builds the full application router over scripted engines so tests
//! exercise the same middleware stack and handlers as production without
//! touching the network.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use glint_api::config::{EngineSettings, ServerConfig};
use glint_api::router::build_app_router;
use glint_api::state::AppState;
use glint_engine::endpoints::RegionMap;
use glint_engine::fallback::FallbackCoordinator;
use glint_engine::testing::{scripted_router, ScriptedEngine};
use glint_tasks::manager::TaskManager;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        engine: EngineSettings {
            regions: RegionMap::parse("us=http://127.0.0.1:9800").unwrap(),
            api_key: String::new(),
            poll_interval_secs: 5,
            max_poll_attempts: 120,
        },
    }
}

/// The application under test plus handles to script its engines.
pub struct TestApp {
    pub app: Router,
    pub tasks: Arc<TaskManager>,
    pub workflow: Arc<ScriptedEngine>,
    pub webapp: Arc<ScriptedEngine>,
}

/// Build the full application router over scripted engines.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let (engine_router, workflow, webapp) = scripted_router();
    let tasks = TaskManager::new(
        FallbackCoordinator::new(engine_router),
        config.engine.poller_config(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        tasks: Arc::clone(&tasks),
    };

    TestApp {
        app: build_app_router(state, &config),
        tasks,
        workflow,
        webapp,
    }
}

/// Issue a GET request against the router.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
