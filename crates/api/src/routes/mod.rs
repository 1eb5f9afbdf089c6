pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tasks                  POST   submit a task
/// /tasks/{id}             GET    task status snapshot
/// /tasks/{id}/results     GET    artifacts of a succeeded task
/// /tasks/{id}/cancel      POST   cancel a task
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/tasks", tasks::router())
}
