//! Analysis API Client - document submission over multipart HTTP
//!
//! Posts a financial document to the backend analyzer. A 423 response is the
//! lock signal: the document needs a password before it can be parsed. The
//! password field, when present, carries an already-encrypted (or tagged
//! fallback) payload, never plaintext.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::crypto::EncryptedPayload;

// ============================================================================
// Data Types
// ============================================================================

/// A user-selected document held in memory for the duration of an attempt.
/// Retained across a lock/retry cycle so the user never re-selects the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Aggregate numbers over the analyzed statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_spend: f64,
    pub transaction_count: u64,
}

/// A single detected financial leak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialLeak {
    pub merchant_hint: String,
    pub leak_category: String,
    pub leak_probability: f64,
    pub reasoning: String,
    pub actionable_step: String,
    pub estimated_annual_saving: f64,
}

/// Full analysis result handed to the dashboard collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub leaks: Vec<FinancialLeak>,
    #[serde(default)]
    pub ai_insights: String,
    #[serde(default)]
    pub raw_data_preview: Vec<serde_json::Value>,
}

// ============================================================================
// API Client
// ============================================================================

/// HTTP client for the document analysis endpoint
pub struct AnalysisApiClient {
    client: Client,
    base_url: String,
}

impl AnalysisApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.http_timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.trimmed_base_url().to_string(),
        }
    }

    /// Submit a document for analysis, optionally carrying the transport
    /// form of its unlock password.
    pub async fn analyze(
        &self,
        document: &UploadDocument,
        transport_secret: Option<&EncryptedPayload>,
    ) -> Result<AnalysisReport, AnalysisApiError> {
        let mut form = Form::new().part(
            "file",
            Part::bytes(document.bytes.clone()).file_name(document.file_name.clone()),
        );

        if let Some(payload) = transport_secret {
            form = form
                .text("password", payload.data.clone())
                .text("password_scheme", payload.scheme.as_str());
        }

        log::info!(
            "Submitting document for analysis: {} ({} bytes, secret: {})",
            document.file_name,
            document.bytes.len(),
            transport_secret.is_some()
        );

        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::LOCKED {
            return Err(AnalysisApiError::Locked);
        }

        if !status.is_success() {
            return Err(AnalysisApiError::Rejected {
                detail: extract_detail(status, response).await,
            });
        }

        response
            .json::<AnalysisReport>()
            .await
            .map_err(|_| AnalysisApiError::InvalidResponse)
    }
}

async fn extract_detail(status: StatusCode, response: reqwest::Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
    }

    if let Ok(body) = response.json::<ErrorBody>().await {
        if let Some(detail) = body.detail {
            return detail;
        }
    }
    match status.canonical_reason() {
        Some(reason) => format!("Error: {}", reason),
        None => format!("Error: {}", status),
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AnalysisApiError {
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    #[error("Request timed out")]
    TimedOut,

    #[error("Document is locked and requires a password")]
    Locked,

    #[error("Analysis rejected: {detail}")]
    Rejected { detail: String },

    #[error("Invalid response from server")]
    InvalidResponse,
}

impl From<reqwest::Error> for AnalysisApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisApiError::TimedOut
        } else {
            AnalysisApiError::Request(e)
        }
    }
}
