//! Sync Module - Gmail-Backed Transaction Ingestion
//!
//! Client side of the email ingestion pipeline:
//! - Request shaping from persisted user intent (date range, token bundle)
//! - Authenticated sync trigger / status / preview calls
//! - Uniform session-expiry handling on unauthorized responses
//!
//! The OAuth completion flow in [`crate::auth`] drives this module after the
//! redirect returns; UI collaborators only consume the typed outcomes.

pub mod api;
pub mod models;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use api::{EmailSyncClient, SyncApiError};
pub use models::{
    DateRange, EmailPreview, EmailSyncStatus, EmailTransaction, SyncOutcome, SyncRequest,
    SyncRequestBuilder, TokenBundle,
};
