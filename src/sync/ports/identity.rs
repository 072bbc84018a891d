//! Token issuer port shared by both store adapters.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;

/// Result type for token issuer operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Bearer token scoped to one downstream audience.
///
/// Wraps the raw token in a secret so it never leaks through `Debug` or
/// log output.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wraps raw token text.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Exposes the raw token for header construction.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Issues bearer tokens for the two downstream services.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token accepted by the collaboration store.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when acquisition fails.
    async fn collaboration_token(&self) -> TokenResult<AccessToken>;

    /// Returns a token accepted by the business store.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when acquisition fails.
    async fn business_token(&self) -> TokenResult<AccessToken>;
}

/// Errors returned by token issuer implementations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// The transport layer failed before a response arrived.
    #[error("token transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The issuer rejected the credential grant.
    #[error("token endpoint returned status {status}: {detail}")]
    Rejected {
        /// HTTP status the issuer answered with.
        status: u16,
        /// Issuer-supplied error text, when present.
        detail: String,
    },

    /// The issuer answered with a body that is not a token grant.
    #[error("token response was malformed: {0}")]
    Malformed(String),
}

impl TokenError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
