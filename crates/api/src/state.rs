use std::sync::Arc;

use glint_tasks::manager::TaskManager;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Task lifecycle manager (submission, polling, cancellation).
    pub tasks: Arc<TaskManager>,
}
