//! Upload Retry Controller - the lock/retry submission state machine
//!
//! States: `Idle -> Submitting -> (Success | Locked | Failed | TimedOut)`, with
//! `Locked -> Submitting` on password entry and `Locked -> Idle` on cancel.
//! Exactly one manual retry path and no automatic retries: every failure is
//! surfaced to the user, who decides what happens next.

use std::sync::Arc;

use super::api::{AnalysisApiClient, AnalysisApiError, AnalysisReport, UploadDocument};
use crate::crypto::{CredentialEncryptor, CryptoError, EncryptedPayload, SecretString};

// ============================================================================
// State Machine Types
// ============================================================================

/// Submission state exposed to the UI collaborator
#[derive(Debug)]
pub enum UploadState {
    Idle,
    Submitting,
    /// Backend signalled the document needs a password; the original file is
    /// retained for the retry
    Locked,
    Failed(String),
    /// The request hit the client-side deadline; terminal, distinct from
    /// `Failed` so the UI can suggest checking connectivity
    TimedOut,
    Success(AnalysisReport),
}

impl UploadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::Submitting => "submitting",
            UploadState::Locked => "locked",
            UploadState::Failed(_) => "failed",
            UploadState::TimedOut => "timed_out",
            UploadState::Success(_) => "success",
        }
    }
}

/// The document currently moving through the state machine. Mutated in place
/// only to attach the transport secret on a retry; dropped on any terminal
/// response.
struct UploadAttempt {
    document: UploadDocument,
    transport_secret: Option<EncryptedPayload>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadFlowError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("no locked document to act on")]
    NotLocked,

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

// ============================================================================
// Controller
// ============================================================================

/// Drives a document submission through the lock/retry protocol.
/// At most one attempt is active per controller instance.
pub struct UploadRetryController {
    api: AnalysisApiClient,
    encryptor: Arc<CredentialEncryptor>,
    state: UploadState,
    attempt: Option<UploadAttempt>,
}

impl UploadRetryController {
    pub fn new(api: AnalysisApiClient, encryptor: Arc<CredentialEncryptor>) -> Self {
        Self {
            api,
            encryptor,
            state: UploadState::Idle,
            attempt: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Start a fresh submission. Rejected while another attempt is in
    /// flight; any previous terminal state is replaced.
    pub async fn submit(&mut self, document: UploadDocument) -> Result<&UploadState, UploadFlowError> {
        if matches!(self.state, UploadState::Submitting) {
            return Err(UploadFlowError::AlreadySubmitting);
        }

        self.attempt = Some(UploadAttempt {
            document,
            transport_secret: None,
        });
        self.dispatch().await;
        Ok(&self.state)
    }

    /// Retry a locked document with its unlock password. The password is
    /// encrypted for transport before it leaves this call; the plaintext is
    /// dropped (and zeroized) here. The original file bytes are reused.
    pub async fn retry_with_password(
        &mut self,
        password: SecretString,
    ) -> Result<&UploadState, UploadFlowError> {
        if !matches!(self.state, UploadState::Locked) {
            return Err(UploadFlowError::NotLocked);
        }
        let attempt = self.attempt.as_mut().ok_or(UploadFlowError::NotLocked)?;

        // TooLarge fails fast and leaves the Locked state untouched so the
        // user can re-enter the password
        attempt.transport_secret = Some(self.encryptor.encrypt(&password)?);
        self.dispatch().await;
        Ok(&self.state)
    }

    /// Abandon a locked document without retrying
    pub fn cancel(&mut self) -> Result<&UploadState, UploadFlowError> {
        if !matches!(self.state, UploadState::Locked) {
            return Err(UploadFlowError::NotLocked);
        }
        self.attempt = None;
        self.state = UploadState::Idle;
        Ok(&self.state)
    }

    async fn dispatch(&mut self) {
        let attempt = match &self.attempt {
            Some(attempt) => attempt,
            None => return,
        };

        self.state = UploadState::Submitting;

        let result = self
            .api
            .analyze(&attempt.document, attempt.transport_secret.as_ref())
            .await;

        self.state = match result {
            Ok(report) => {
                self.attempt = None;
                UploadState::Success(report)
            }
            Err(AnalysisApiError::Locked) => {
                log::info!("Document is password protected, awaiting unlock");
                UploadState::Locked
            }
            Err(AnalysisApiError::TimedOut) => {
                log::error!("Document analysis timed out");
                self.attempt = None;
                UploadState::TimedOut
            }
            Err(e) => {
                log::error!("Document analysis failed: {}", e);
                self.attempt = None;
                UploadState::Failed(e.to_string())
            }
        };
    }
}

// ============================================================================
// Tests
// ============================================================================
