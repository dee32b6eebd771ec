//! Session state shared across the client
//!
//! Two small stores with strict access contracts:
//! - [`SessionStore`]: the bearer token every authenticated call reads.
//!   Injected explicitly into each client instead of living in ambient
//!   globals, with a set/get/clear contract and last-writer-wins semantics.
//! - [`IntentStore`]: the date-range choice made before the OAuth redirect.
//!   It must survive the round trip to the identity provider and be consumed
//!   at most once on return, so the only read operation is a get-then-clear.

use tokio::sync::RwLock;

/// Bearer-token session context for authenticated backend calls
#[derive(Default)]
pub struct SessionStore {
    token: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the bearer token. Idempotent: re-setting the same token after
    /// a duplicate redirect delivery is safe.
    pub async fn set_token(&self, token: String) {
        let mut guard = self.token.write().await;
        *guard = Some(token);
    }

    /// Current bearer token, if a session is active
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Drop the session (logout or session expiry)
    pub async fn clear(&self) {
        let mut guard = self.token.write().await;
        *guard = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}

/// Redirect-surviving store for the user's chosen ingestion date range.
///
/// Written before navigating away to the identity provider, consumed exactly
/// once on return. `consume` clears atomically under the lock, so a
/// duplicate redirect delivery finds the store empty and falls back to the
/// default range instead of double-triggering.
#[derive(Default)]
pub struct IntentStore {
    date_range: std::sync::Mutex<Option<String>>,
}

impl IntentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist the raw date-range choice ahead of the OAuth redirect
    pub fn store(&self, raw_range: String) {
        let mut guard = self.date_range.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(raw_range);
    }

    /// Take the stored intent, clearing it in the same step
    pub fn consume(&self) -> Option<String> {
        let mut guard = self.date_range.lock().unwrap_or_else(|e| e.into_inner());
        guard.take()
    }

    /// Non-consuming check, for UI display only
    pub fn peek(&self) -> Option<String> {
        let guard = self.date_range.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }
}
