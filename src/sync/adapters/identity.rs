//! Client-credentials token provider for both store audiences.
//!
//! Acquires app-only bearer tokens from the tenant's authority and caches
//! them per audience until shortly before expiry, so each reconciliation
//! pass costs at most one grant per store.

use crate::sync::ports::{AccessToken, TokenError, TokenProvider, TokenResult};
use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Default authority the credential grant is sent to.
pub const DEFAULT_AUTHORITY_BASE: &str = "https://login.microsoftonline.com";

/// Default app-only scope for the collaboration store.
pub const DEFAULT_COLLABORATION_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Lifetime assumed when the issuer omits one.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Margin subtracted from the advertised lifetime before a token is
/// considered stale.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Derives the app-only scope for a resource URL.
#[must_use]
pub fn resource_scope(resource: &Url) -> String {
    format!("{}/.default", resource.as_str().trim_end_matches('/'))
}

/// Credential and audience settings for the token provider.
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    tenant_id: String,
    client_id: String,
    client_secret: SecretString,
    authority_base: String,
    collaboration_scope: String,
    business_scope: String,
}

impl IdentitySettings {
    /// Creates settings for one app registration.
    ///
    /// The authority and collaboration scope take their hosted defaults;
    /// the business scope is derived from the organization resource URL.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
        business_resource: &Url,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret,
            authority_base: DEFAULT_AUTHORITY_BASE.to_owned(),
            collaboration_scope: DEFAULT_COLLABORATION_SCOPE.to_owned(),
            business_scope: resource_scope(business_resource),
        }
    }

    /// Overrides the authority base URL.
    #[must_use]
    pub fn with_authority_base(mut self, base: impl Into<String>) -> Self {
        self.authority_base = base.into();
        self
    }

    /// Overrides the collaboration store scope.
    #[must_use]
    pub fn with_collaboration_scope(mut self, scope: impl Into<String>) -> Self {
        self.collaboration_scope = scope.into();
        self
    }

    /// Overrides the business store scope.
    #[must_use]
    pub fn with_business_scope(mut self, scope: impl Into<String>) -> Self {
        self.business_scope = scope.into();
        self
    }

    /// Returns the tenant identifier.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Returns the app registration client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    #[must_use]
    pub const fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    /// Returns the authority base URL.
    #[must_use]
    pub fn authority_base(&self) -> &str {
        &self.authority_base
    }

    /// Returns the collaboration store scope.
    #[must_use]
    pub fn collaboration_scope(&self) -> &str {
        &self.collaboration_scope
    }

    /// Returns the business store scope.
    #[must_use]
    pub fn business_scope(&self) -> &str {
        &self.business_scope
    }
}

/// Token issuer backed by the OAuth 2.0 client-credentials grant.
pub struct ClientCredentialsProvider {
    client: Client,
    settings: IdentitySettings,
    collaboration: RwLock<Option<CachedToken>>,
    business: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    token: AccessToken,
    expires_at: Instant,
}

/// Successful grant body.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Failed grant body.
#[derive(Debug, Default, Deserialize)]
struct TokenFailure {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenFailure {
    fn detail(self) -> String {
        self.error_description
            .or(self.error)
            .unwrap_or_else(|| "unknown".to_owned())
    }
}

impl ClientCredentialsProvider {
    /// Creates a provider over the given settings.
    #[must_use]
    pub fn new(settings: IdentitySettings) -> Self {
        Self {
            client: Client::new(),
            settings,
            collaboration: RwLock::new(None),
            business: RwLock::new(None),
        }
    }

    async fn token_for(
        &self,
        audience: &'static str,
        scope: &str,
        cache: &RwLock<Option<CachedToken>>,
    ) -> TokenResult<AccessToken> {
        {
            let guard = cache.read().await;
            let live = guard
                .as_ref()
                .filter(|cached| cached.expires_at > Instant::now());
            if let Some(cached) = live {
                return Ok(cached.token.clone());
            }
        }

        debug!(audience, "token cache miss; acquiring");
        let grant = self.request_token(scope).await?;
        let lifetime = grant
            .expires_in
            .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);
        let token = AccessToken::new(grant.access_token);
        let cached = CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        };
        *cache.write().await = Some(cached);
        debug!(audience, expires_in = ?grant.expires_in, "token acquired");
        Ok(token)
    }

    async fn request_token(&self, scope: &str) -> TokenResult<TokenGrant> {
        let authority = self.settings.authority_base.trim_end_matches('/');
        let url = format!(
            "{authority}/{tenant}/oauth2/v2.0/token",
            tenant = self.settings.tenant_id
        );
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.settings.client_id()),
            ("client_secret", self.settings.client_secret.expose_secret()),
            ("scope", scope),
        ];
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(TokenError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let failure: TokenFailure = response.json().await.unwrap_or_default();
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                detail: failure.detail(),
            });
        }
        response
            .json::<TokenGrant>()
            .await
            .map_err(|err| TokenError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn collaboration_token(&self) -> TokenResult<AccessToken> {
        self.token_for(
            "collaboration",
            self.settings.collaboration_scope(),
            &self.collaboration,
        )
        .await
    }

    async fn business_token(&self) -> TokenResult<AccessToken> {
        self.token_for("business", self.settings.business_scope(), &self.business)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("https://org.crm.dynamics.com", "https://org.crm.dynamics.com/.default")]
    #[case::trailing_slash("https://org.crm.dynamics.com/", "https://org.crm.dynamics.com/.default")]
    fn resource_scope_derivation(#[case] resource: &str, #[case] expected: &str) {
        let url = Url::parse(resource).expect("resource URL should parse");

        assert_eq!(resource_scope(&url), expected);
    }

    #[rstest]
    #[case::description_preferred(
        Some("AADSTS700016: app not found"),
        Some("invalid_client"),
        "AADSTS700016: app not found"
    )]
    #[case::code_fallback(None, Some("invalid_client"), "invalid_client")]
    #[case::neither(None, None, "unknown")]
    fn failure_detail_precedence(
        #[case] description: Option<&str>,
        #[case] code: Option<&str>,
        #[case] expected: &str,
    ) {
        let failure = TokenFailure {
            error: code.map(str::to_owned),
            error_description: description.map(str::to_owned),
        };

        assert_eq!(failure.detail(), expected);
    }
}
