//! Auth Module - OAuth Redirect Completion
//!
//! Consumes the redirect back from the identity provider and drives the
//! post-authentication flow: token persistence, the consent gate, and the
//! hand-off into email ingestion.

pub mod callback;

// Re-export commonly used types
pub use callback::{CallbackError, CallbackState, OAuthCompletionController, RedirectParams};
