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
    /// Allowed CORS origins, parsed from the comma-separated
    /// `KONGWATCH_CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`). Bounds how long
    /// the dispatcher task is waited on after the bus closes.
    pub shutdown_timeout_secs: u64,
    /// Public dashboard URL referenced from Slack context lines. Unset means
    /// the context line renders "N/A".
    pub dashboard_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                    |
    /// |----------------------------------|----------------------------|
    /// | `KONGWATCH_HOST`                 | `0.0.0.0`                  |
    /// | `KONGWATCH_PORT`                 | `3000`                     |
    /// | `KONGWATCH_CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `KONGWATCH_REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `KONGWATCH_SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `KONGWATCH_URL`                  | (unset)                    |
    pub fn from_env() -> Self {
        let host = std::env::var("KONGWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("KONGWATCH_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("KONGWATCH_PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("KONGWATCH_CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("KONGWATCH_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("KONGWATCH_REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("KONGWATCH_SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("KONGWATCH_SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let dashboard_url = std::env::var("KONGWATCH_URL")
            .ok()
            .and_then(|raw| normalize_dashboard_url(&raw));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            dashboard_url,
        }
    }
}

/// Trim whitespace and trailing slashes; a value that is empty after
/// trimming counts as unset.
fn normalize_dashboard_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
