//! # LeakDetector Client Core
//!
//! Client-side core of the LeakDetector financial-leak-analysis product.
//! The UI (pages, charts, routing) is an external collaborator; this crate
//! holds the parts with real invariants:
//!
//! - [`crypto`]: RSA-OAEP transport encryption for document-unlock passwords
//! - [`upload`]: the lock/retry document submission state machine
//! - [`auth`]: the OAuth completion flow after the Gmail consent redirect
//! - [`sync`]: the authenticated email ingestion client
//! - [`session`]: injectable bearer-token and date-range-intent stores

pub mod auth;
pub mod config;
pub mod crypto;
pub mod session;
pub mod sync;
pub mod upload;

pub use auth::{CallbackState, OAuthCompletionController, RedirectParams};
pub use config::ClientConfig;
pub use crypto::{CredentialEncryptor, EncryptedPayload, EncryptionScheme, SecretString};
pub use session::{IntentStore, SessionStore};
pub use sync::{DateRange, EmailSyncClient, SyncOutcome, SyncRequestBuilder, TokenBundle};
pub use upload::{AnalysisApiClient, AnalysisReport, UploadDocument, UploadRetryController, UploadState};

/// Initialize logging from the environment (`.env` honored, `RUST_LOG`
/// overrides, `info` by default). Safe to call more than once.
pub fn init_logging() {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
