use glint_engine::endpoints::RegionMap;
use glint_tasks::poller::PollerConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Remote engine settings (regions, credentials, polling).
    pub engine: EngineSettings,
}

/// Configuration for the remote execution engines.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Region key to base URL table; read-only after startup.
    pub regions: RegionMap,
    /// API key sent with every engine call.
    pub api_key: String,
    /// Seconds between consecutive status polls.
    pub poll_interval_secs: u64,
    /// Status poll budget before a task times out.
    pub max_poll_attempts: u32,
}

impl EngineSettings {
    /// Polling parameters for the task manager.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: std::time::Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_poll_attempts,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `3000`                           |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `REGION_ENDPOINTS`     | `default=http://127.0.0.1:9800`  |
    /// | `ENGINE_API_KEY`       | (empty)                          |
    /// | `POLL_INTERVAL_SECS`   | `5`                              |
    /// | `MAX_POLL_ATTEMPTS`    | `120`                            |
    ///
    /// Panics on malformed values; misconfiguration should fail fast at
    /// startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let regions = RegionMap::parse(
            &std::env::var("REGION_ENDPOINTS")
                .unwrap_or_else(|_| "default=http://127.0.0.1:9800".into()),
        )
        .expect("REGION_ENDPOINTS must be a name=url[,name=url] table");

        let api_key = std::env::var("ENGINE_API_KEY").unwrap_or_default();

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let max_poll_attempts: u32 = std::env::var("MAX_POLL_ATTEMPTS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("MAX_POLL_ATTEMPTS must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            engine: EngineSettings {
                regions,
                api_key,
                poll_interval_secs,
                max_poll_attempts,
            },
        }
    }
}
