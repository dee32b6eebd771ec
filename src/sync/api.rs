//! Email Sync API Client - HTTP communication with the LeakDetector backend
//!
//! Handles the authenticated REST calls of the email ingestion path:
//! - Sync trigger with a date-range window
//! - Sync status polling
//! - Transaction preview
//!
//! Every call authenticates with the bearer token held by the injected
//! session context. An unauthorized response clears that context before the
//! error is surfaced, which is the uniform session-expiry policy for all
//! authenticated calls (the caller then routes to login).

use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use super::models::{EmailPreview, EmailSyncStatus, SyncOutcome, SyncRequest};
use crate::config::ClientConfig;
use crate::session::SessionStore;

/// API client for the email ingestion endpoints
pub struct EmailSyncClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl EmailSyncClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.http_timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.trimmed_base_url().to_string(),
            session,
        }
    }

    /// Trigger server-side mailbox ingestion for the given window
    pub async fn sync_with_range(&self, request: &SyncRequest) -> Result<SyncOutcome, SyncApiError> {
        let token = self.bearer().await?;

        log::info!(
            "Starting email sync: range={}, max_emails={}",
            request.date_range.as_str(),
            request.max_emails
        );

        let response = self
            .client
            .post(format!("{}/api/email/sync-with-range", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Current sync status for the authenticated user
    pub async fn sync_status(&self) -> Result<EmailSyncStatus, SyncApiError> {
        let token = self.bearer().await?;

        let response = self
            .client
            .get(format!("{}/api/email/status", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Preview recently extracted email transactions
    pub async fn preview_transactions(&self, limit: u32) -> Result<EmailPreview, SyncApiError> {
        let token = self.bearer().await?;

        let response = self
            .client
            .get(format!("{}/api/email/preview?limit={}", self.base_url, limit))
            .bearer_auth(token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn bearer(&self) -> Result<String, SyncApiError> {
        self.session.token().await.ok_or(SyncApiError::Unauthorized)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SyncApiError> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|_| SyncApiError::InvalidResponse)
        } else {
            Err(self.handle_error(response).await)
        }
    }

    /// Convert an error response into a typed failure. A 401 also clears the
    /// session so every collaborator observes the expiry at once.
    async fn handle_error(&self, response: reqwest::Response) -> SyncApiError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Session expired during sync call, clearing credentials");
            self.session.clear().await;
            return SyncApiError::Unauthorized;
        }

        SyncApiError::Rejected {
            detail: extract_detail(status, response).await,
        }
    }
}

/// Best-effort human-readable reason: the JSON `detail` field if the body
/// carries one, else the HTTP status line.
async fn extract_detail(status: StatusCode, response: reqwest::Response) -> String {
    if let Ok(body) = response.json::<ErrorBody>().await {
        if let Some(detail) = body.detail {
            return detail;
        }
    }
    match status.canonical_reason() {
        Some(reason) => format!("HTTP error! status: {}", reason),
        None => format!("HTTP error! status: {}", status),
    }
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SyncApiError {
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    #[error("Request timed out")]
    TimedOut,

    #[error("Unauthorized - login required")]
    Unauthorized,

    #[error("Sync rejected: {detail}")]
    Rejected { detail: String },

    #[error("Invalid response from server")]
    InvalidResponse,
}

impl From<reqwest::Error> for SyncApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncApiError::TimedOut
        } else {
            SyncApiError::Request(e)
        }
    }
}
