//! Client Configuration Module

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_MAX_EMAILS: u32 = 100;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Endpoints and limits for the LeakDetector backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analysis/sync backend
    pub api_base_url: String,
    /// Upper bound on emails ingested per sync request
    pub max_emails: u32,
    /// Per-request timeout applied to every HTTP call
    pub http_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_emails: DEFAULT_MAX_EMAILS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the environment (`.env` honored via dotenvy),
    /// falling back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base_url = std::env::var("LEAKDETECTOR_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let max_emails = std::env::var("LEAKDETECTOR_MAX_EMAILS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_EMAILS);
        let http_timeout_secs = std::env::var("LEAKDETECTOR_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            api_base_url,
            max_emails,
            http_timeout_secs,
        }
    }

    /// Base URL with any trailing slash removed, for path joining
    pub fn trimmed_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
