//! auth - bearer credentials for the object store
//!
//! # Design
//!
//! The engine treats credential acquisition as someone else's problem:
//! a [`TokenProvider`] hands over a bearer token on demand, and the
//! store attaches it to every request. The engine never refreshes or
//! caches tokens itself. A store without a usable provider fails with
//! a missing-credential error before any network call is attempted.
//!
//! # Security
//!
//! Tokens must never appear in logs, JSON outputs, error messages, or
//! debug output. Types in this module implement custom `Debug` to
//! redact token values.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from credential providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No credential has been configured.
    #[error("no credential configured")]
    MissingToken,

    /// The provider failed to produce a token.
    #[error("credential provider failed: {0}")]
    Provider(String),
}

/// Trait for providing bearer tokens to object-store adapters.
///
/// Implementations may refresh tokens internally; the store calls
/// [`bearer_token`] once per request and retries once with a fresh
/// token on auth failures when the provider supports refresh.
///
/// [`bearer_token`]: TokenProvider::bearer_token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a valid bearer token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingToken`] if no credential exists
    /// - [`AuthError::Provider`] if the provider fails
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Check if a credential is available without fetching it.
    fn is_authenticated(&self) -> bool;

    /// Whether a failed request may succeed with a re-fetched token.
    ///
    /// Static tokens never change, so the default is `false`.
    fn supports_refresh(&self) -> bool {
        false
    }
}

/// A provider wrapping a fixed token (for example `GITHUB_TOKEN` in CI).
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wrap a fixed token. An empty token is accepted here and reported
    /// as [`AuthError::MissingToken`] when first used.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(self.token.clone())
    }

    fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

// Custom Debug to avoid exposing the token.
impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("is_authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
