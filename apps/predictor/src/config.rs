use std::time::Duration;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
/// Fails at startup if the analysis endpoint is not configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis_service_url: String,
    pub analysis_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    /// `endpoint_override` (e.g. from the command line) takes precedence over
    /// `ANALYSIS_SERVICE_URL`.
    pub fn from_env(endpoint_override: Option<String>) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let analysis_service_url = match endpoint_override {
            Some(url) => url,
            None => require_env("ANALYSIS_SERVICE_URL")?,
        };

        Ok(Config {
            analysis_service_url,
            analysis_timeout: Duration::from_secs(
                std::env::var("ANALYSIS_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "180".to_string())
                    .parse::<u64>()
                    .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
