//! Sync data models and request shaping
//!
//! Wire types for the email ingestion API plus the pure
//! [`SyncRequestBuilder`] that turns persisted user intent into a request
//! body. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Date Range Intent
// ============================================================================

/// Historical window for mailbox ingestion, chosen before the OAuth redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DateRange {
    #[default]
    #[serde(rename = "30_days")]
    ThirtyDays,
    #[serde(rename = "60_days")]
    SixtyDays,
    #[serde(rename = "90_days")]
    NinetyDays,
    #[serde(rename = "1_year")]
    OneYear,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::ThirtyDays => "30_days",
            DateRange::SixtyDays => "60_days",
            DateRange::NinetyDays => "90_days",
            DateRange::OneYear => "1_year",
        }
    }

    /// Lenient parse for values read back from the intent store. Unknown or
    /// absent values become the 30-day default; the redirect return path
    /// must never fail on a bad enum.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some("30_days") => DateRange::ThirtyDays,
            Some("60_days") => DateRange::SixtyDays,
            Some("90_days") => DateRange::NinetyDays,
            Some("1_year") => DateRange::OneYear,
            _ => DateRange::default(),
        }
    }

    pub fn all() -> [DateRange; 4] {
        [
            DateRange::ThirtyDays,
            DateRange::SixtyDays,
            DateRange::NinetyDays,
            DateRange::OneYear,
        ]
    }
}

// ============================================================================
// Token Bundle
// ============================================================================

/// Credentials handed back by the OAuth redirect, parsed exactly once.
/// Owned by the completion controller and moved into the ingestion path;
/// UI collaborators only ever see the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub email: Option<String>,
}

impl TokenBundle {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            email: None,
        }
    }
}

// ============================================================================
// Sync Request / Outcome
// ============================================================================

/// JSON body for the sync trigger endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub date_range: DateRange,
    pub max_emails: u32,
}

/// Shapes a token bundle and persisted date-range intent into a
/// [`SyncRequest`]. Pure data shaping: no I/O, no stored state beyond the
/// configured email cap, and a bad range string degrades to the default
/// rather than erroring.
#[derive(Debug, Clone, Copy)]
pub struct SyncRequestBuilder {
    max_emails: u32,
}

impl SyncRequestBuilder {
    pub fn new(max_emails: u32) -> Self {
        Self { max_emails }
    }

    /// Build the request body. The bundle's access token authenticates the
    /// call through the session context (Authorization header), so only the
    /// intent fields shape the body itself.
    pub fn build(&self, bundle: &TokenBundle, raw_range: Option<&str>) -> SyncRequest {
        debug_assert!(!bundle.access_token.is_empty());
        SyncRequest {
            date_range: DateRange::parse_or_default(raw_range),
            max_emails: self.max_emails,
        }
    }
}

/// Terminal result of a mailbox ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub status: String,
    pub emails_processed: u64,
    pub transactions_found: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates_skipped: Option<u64>,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Sync Status / Preview
// ============================================================================

/// Current ingestion state for the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSyncStatus {
    pub last_sync: Option<DateTime<Utc>>,
    pub total_emails_synced: u64,
    pub total_transactions: u64,
    pub sync_in_progress: bool,
}

/// One transaction extracted from a synced email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTransaction {
    pub email_id: String,
    pub date: String,
    pub amount: f64,
    pub trans_type: String,
    pub merchant: String,
    pub category: Option<String>,
    #[serde(default)]
    pub category_confidence: f64,
}

/// Preview of recently extracted email transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPreview {
    pub total_emails: u64,
    #[serde(default)]
    pub transactions: Vec<EmailTransaction>,
}

// ============================================================================
// Tests
// ============================================================================
