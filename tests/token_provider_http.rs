//! HTTP mock tests for the client-credentials token provider.
//!
//! Uses wiremock to simulate the tenant authority, verifying the grant
//! request shape, per-audience caching, and failure reporting.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use brunel::sync::adapters::identity::{ClientCredentialsProvider, IdentitySettings};
use brunel::sync::ports::{TokenError, TokenProvider};
use reqwest::Url;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/tenant-1/oauth2/v2.0/token";

fn provider(server: &MockServer) -> ClientCredentialsProvider {
    let settings = IdentitySettings::new(
        "tenant-1",
        "app-123",
        SecretString::new("app-secret".into()),
        &Url::parse("https://org.example").expect("resource URL should parse"),
    )
    .with_authority_base(server.uri());
    ClientCredentialsProvider::new(settings)
}

// =============================================================================
// Grant Requests
// =============================================================================

#[tokio::test]
async fn grant_posts_form_credentials_to_the_tenant_authority() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=app-123"))
        .and(body_string_contains("client_secret=app-secret"))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fgraph.microsoft.com%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "tok-1",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = provider(&server)
        .collaboration_token()
        .await
        .expect("grant should succeed");

    assert_eq!(token.expose_secret(), "tok-1");
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn live_token_is_reused_without_a_second_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = provider(&server);
    let first = tokens
        .collaboration_token()
        .await
        .expect("first grant should succeed");
    let second = tokens
        .collaboration_token()
        .await
        .expect("cached token should be returned");

    assert_eq!(first.expose_secret(), second.expose_secret());
}

#[tokio::test]
async fn audiences_do_not_share_a_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fgraph.microsoft.com%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "collab-tok",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains(
            "scope=https%3A%2F%2Forg.example%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "business-tok",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = provider(&server);
    let collaboration = tokens
        .collaboration_token()
        .await
        .expect("collaboration grant should succeed");
    let business = tokens
        .business_token()
        .await
        .expect("business grant should succeed");

    assert_eq!(collaboration.expose_secret(), "collab-tok");
    assert_eq!(business.expose_secret(), "business-tok");
}

#[tokio::test]
async fn zero_lifetime_grant_is_reacquired_on_the_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-short",
            "expires_in": 0
        })))
        .expect(2)
        .mount(&server)
        .await;

    let tokens = provider(&server);
    tokens
        .collaboration_token()
        .await
        .expect("first grant should succeed");
    tokens
        .collaboration_token()
        .await
        .expect("expired token should be reacquired");
}

// =============================================================================
// Failure Reporting
// =============================================================================

#[tokio::test]
async fn rejection_carries_the_issuer_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret"
        })))
        .mount(&server)
        .await;

    let error = provider(&server)
        .collaboration_token()
        .await
        .expect_err("rejected grant should error");

    assert!(matches!(
        error,
        TokenError::Rejected { status: 401, ref detail }
            if detail == "AADSTS7000215: Invalid client secret"
    ));
}

#[tokio::test]
async fn malformed_grant_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not a grant"))
        .mount(&server)
        .await;

    let error = provider(&server)
        .collaboration_token()
        .await
        .expect_err("unparseable grant should error");

    assert!(matches!(error, TokenError::Malformed(_)));
}
