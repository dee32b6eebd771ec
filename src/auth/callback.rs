//! OAuth Completion - the return leg of the Google consent redirect
//!
//! The browser comes back from the identity provider with query parameters
//! (`token`, `needs_consent`, `error`). This module parses them exactly
//! once, persists the bearer token, and drives the follow-up:
//!
//! `Start -> (Error | AwaitingConsent | Syncing) -> (Done | SyncFailed | TimedOut)`
//!
//! The date-range intent stored before the redirect is consumed at most
//! once; re-delivering the same redirect is a no-op.

use std::sync::Arc;
use url::Url;

use crate::session::{IntentStore, SessionStore};
use crate::sync::{EmailSyncClient, SyncApiError, SyncOutcome, SyncRequestBuilder, TokenBundle};

/// Query parameters the redirect can set, stripped after consumption
const OAUTH_PARAMS: [&str; 6] = [
    "token",
    "access_token",
    "refresh_token",
    "email",
    "needs_consent",
    "error",
];

// ============================================================================
// Redirect Parameters
// ============================================================================

/// Parsed view of a single redirect event
#[derive(Debug, Clone, Default)]
pub struct RedirectParams {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub email: Option<String>,
    pub needs_consent: bool,
    pub error: Option<String>,
}

impl RedirectParams {
    /// Read the OAuth parameters from the redirect URL. `token` and the
    /// legacy `access_token` spelling are both accepted.
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "token" | "access_token" => params.token = Some(value.into_owned()),
                "refresh_token" => params.refresh_token = Some(value.into_owned()),
                "email" => params.email = Some(value.into_owned()),
                "needs_consent" => params.needs_consent = value == "true",
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// The redirect URL with the OAuth parameters removed. The collaborator
    /// replaces the visible URL with this so a refresh cannot re-deliver the
    /// same redirect.
    pub fn stripped_url(url: &Url) -> Url {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !OAUTH_PARAMS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut stripped = url.clone();
        stripped.set_query(None);
        if !kept.is_empty() {
            stripped
                .query_pairs_mut()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        stripped
    }

    fn into_bundle(self) -> Option<TokenBundle> {
        let access_token = self.token?;
        Some(TokenBundle {
            access_token,
            refresh_token: self.refresh_token,
            email: self.email,
        })
    }
}

// ============================================================================
// State Machine Types
// ============================================================================

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("identity provider returned '{0}'")]
    Provider(String),

    #[error("redirect carried no bearer token")]
    MissingToken,
}

/// Completion-flow state exposed to the UI collaborator
#[derive(Debug)]
pub enum CallbackState {
    Start,
    /// Terminal; the route goes back to login. No token was persisted.
    Error(CallbackError),
    /// Waiting for the consent collaborator's confirmation signal
    AwaitingConsent,
    Syncing,
    Done(SyncOutcome),
    /// Terminal for this controller instance; the user re-triggers
    /// ingestion through a fresh action
    SyncFailed(String),
    /// The sync call hit the client-side deadline; terminal, distinct from
    /// `SyncFailed`
    TimedOut,
}

impl CallbackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackState::Start => "start",
            CallbackState::Error(_) => "error",
            CallbackState::AwaitingConsent => "awaiting_consent",
            CallbackState::Syncing => "syncing",
            CallbackState::Done(_) => "done",
            CallbackState::SyncFailed(_) => "sync_failed",
            CallbackState::TimedOut => "timed_out",
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Drives one redirect event to a terminal state. Construct a fresh
/// instance per redirect; duplicate deliveries to the same instance are
/// no-ops.
pub struct OAuthCompletionController {
    session: Arc<SessionStore>,
    intents: Arc<IntentStore>,
    sync_client: Arc<EmailSyncClient>,
    builder: SyncRequestBuilder,
    state: CallbackState,
    bundle: Option<TokenBundle>,
}

impl OAuthCompletionController {
    pub fn new(
        session: Arc<SessionStore>,
        intents: Arc<IntentStore>,
        sync_client: Arc<EmailSyncClient>,
        builder: SyncRequestBuilder,
    ) -> Self {
        Self {
            session,
            intents,
            sync_client,
            builder,
            state: CallbackState::Start,
            bundle: None,
        }
    }

    pub fn state(&self) -> &CallbackState {
        &self.state
    }

    /// Entry point for the redirect event. Resolves consent state, persists
    /// the token, and either waits for consent or starts ingestion.
    /// Re-entry with the same parameters after the flow has left `Start`
    /// does nothing.
    pub async fn handle_redirect(&mut self, params: RedirectParams) -> &CallbackState {
        if !matches!(self.state, CallbackState::Start) {
            log::debug!(
                "Duplicate redirect delivery ignored in state '{}'",
                self.state.as_str()
            );
            return &self.state;
        }

        if let Some(code) = params.error {
            log::warn!("OAuth redirect carried error '{}'", code);
            self.state = CallbackState::Error(CallbackError::Provider(code));
            return &self.state;
        }

        let needs_consent = params.needs_consent;
        let bundle = match params.into_bundle() {
            Some(bundle) => bundle,
            None => {
                log::warn!("OAuth redirect carried no token");
                self.state = CallbackState::Error(CallbackError::MissingToken);
                return &self.state;
            }
        };

        // Persist immediately so authenticated calls work; idempotent on
        // duplicate delivery
        self.session.set_token(bundle.access_token.clone()).await;
        self.bundle = Some(bundle);

        if needs_consent {
            self.state = CallbackState::AwaitingConsent;
        } else {
            self.run_sync().await;
        }

        &self.state
    }

    /// Consent confirmation signal from the consent collaborator. The only
    /// exit from `AwaitingConsent`; decline never reaches this controller.
    pub async fn confirm_consent(&mut self) -> &CallbackState {
        if !matches!(self.state, CallbackState::AwaitingConsent) {
            log::debug!(
                "Consent signal ignored in state '{}'",
                self.state.as_str()
            );
            return &self.state;
        }
        self.run_sync().await;
        &self.state
    }

    async fn run_sync(&mut self) {
        self.state = CallbackState::Syncing;

        // Single-read intent: a duplicate round trip finds the store empty
        // and falls back to the default window
        let raw_range = self.intents.consume();
        let bundle = match self.bundle.clone() {
            Some(bundle) => bundle,
            None => {
                self.state = CallbackState::Error(CallbackError::MissingToken);
                return;
            }
        };
        let request = self.builder.build(&bundle, raw_range.as_deref());

        match self.sync_client.sync_with_range(&request).await {
            Ok(outcome) => {
                log::info!(
                    "Email sync finished: {} emails, {} transactions",
                    outcome.emails_processed,
                    outcome.transactions_found
                );
                self.state = CallbackState::Done(outcome);
            }
            Err(SyncApiError::TimedOut) => {
                log::error!("Email sync timed out");
                self.state = CallbackState::TimedOut;
            }
            Err(e) => {
                log::error!("Email sync failed: {}", e);
                self.state = CallbackState::SyncFailed(format!(
                    "Failed to sync emails. You can try again later. ({})",
                    e
                ));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
