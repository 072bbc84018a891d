//! Fixed-token provider for adapter tests.

use async_trait::async_trait;

use crate::sync::ports::{AccessToken, TokenProvider, TokenResult};

/// Token provider that hands out one fixed token for both audiences.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider returning the given token text.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn collaboration_token(&self) -> TokenResult<AccessToken> {
        Ok(AccessToken::new(self.token.clone()))
    }

    async fn business_token(&self) -> TokenResult<AccessToken> {
        Ok(AccessToken::new(self.token.clone()))
    }
}
