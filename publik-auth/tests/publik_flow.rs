//! Publik sign-in flow tests
//!
//! Runs the provider against a local stub of the Publik OIDC endpoints:
//! - Authorization code exchange
//! - User-info retrieval with bearer auth, once per attempt
//! - Claim normalization into the authentication result

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use publik_auth::prelude::*;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct StubState {
    user_info_hits: Arc<AtomicUsize>,
    list_body_first: bool,
}

async fn token(body: String) -> impl IntoResponse {
    if body.contains("code=good-code") && body.contains("code_verifier=verifier") {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": "stub-access-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "stub-refresh-token"
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
    }
}

async fn user_info(State(state): State<StubState>, headers: HeaderMap) -> impl IntoResponse {
    let previous_hits = state.user_info_hits.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer stub-access-token");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(Value::Null));
    }

    if state.list_body_first && previous_hits == 0 {
        return (StatusCode::OK, Json(json!(["a", "b"])));
    }

    (
        StatusCode::OK,
        Json(json!({
            "sub": "b3c8a0d2",
            "email": "Jane.Doe@Example.com",
            "given_name": "Jane",
            "family_name": "Doe",
            "preferred_username": "",
            "nickname": "jd"
        })),
    )
}

/// Start the stub provider and return its site URL
async fn spawn_stub_provider(state: StubState) -> String {
    let app = Router::new()
        .route("/idp/oidc/token/", post(token))
        .route("/idp/oidc/user_info/", get(user_info))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub provider");
    let addr = listener.local_addr().expect("Stub provider has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub provider failed");
    });

    format!("http://{addr}")
}

fn provider_for(site: String) -> PublikProvider {
    PublikProvider::new(&PublikSettings {
        site: Some(site),
        client_id: "CLIENT_ID".to_string(),
        client_secret: "CLIENT_SECRET".to_string(),
        ..PublikSettings::default()
    })
    .expect("Failed to configure provider")
}

#[tokio::test]
async fn test_full_sign_in_flow() {
    let state = StubState::default();
    let provider = provider_for(spawn_stub_provider(state.clone()).await);
    let callback_url = provider.callback_url(&RequestContext::new("https://app.example.com", ""));

    let token = provider
        .exchange_code("good-code", "verifier", &callback_url)
        .await
        .expect("Token exchange failed");
    assert_eq!(token.access_token, "stub-access-token");
    assert_eq!(token.refresh_token.as_deref(), Some("stub-refresh-token"));
    assert!(token.token_type.eq_ignore_ascii_case("bearer"));
    assert!(token.expires_at.is_some());
    assert!(!token.is_expired());

    let attempt = provider.attempt(token);
    let auth_hash = attempt.auth_hash().await.expect("Failed to build auth hash");

    assert_eq!(auth_hash.provider, "publik");
    assert_eq!(auth_hash.uid, "b3c8a0d2");
    assert_eq!(auth_hash.info.email, "jane.doe@example.com");
    assert_eq!(auth_hash.info.name, "Jane Doe");
    assert_eq!(auth_hash.info.nickname, "Jane Doe");
    assert_eq!(auth_hash.info.image, "");
    assert_eq!(auth_hash.credentials.token, "stub-access-token");
    assert!(auth_hash.credentials.expires);
    assert_eq!(
        auth_hash.extra.raw_info.text("nickname").as_deref(),
        Some("jd")
    );

    // Claims are cached for the rest of the attempt
    assert_eq!(attempt.uid().await.unwrap(), "b3c8a0d2");
    assert_eq!(attempt.info().await.unwrap().name, "Jane Doe");
    assert_eq!(state.user_info_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_code() {
    let provider = provider_for(spawn_stub_provider(StubState::default()).await);
    let callback_url = provider.callback_url(&RequestContext::new("https://app.example.com", ""));

    let err = provider
        .exchange_code("bad-code", "verifier", &callback_url)
        .await
        .unwrap_err();

    assert!(matches!(err, OAuthError::TokenExchangeFailed(_)));
}

#[tokio::test]
async fn test_user_info_rejects_unknown_token() {
    let state = StubState::default();
    let provider = provider_for(spawn_stub_provider(state.clone()).await);

    let attempt = provider.attempt(OAuthToken::bearer("someone-else"));
    let err = attempt.raw_info().await.unwrap_err();

    assert!(matches!(err, OAuthError::UserInfoFailed(_)));
    assert_eq!(err.to_string(), "Failed to fetch user information: HTTP 401 Unauthorized");
    assert_eq!(state.user_info_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_object_user_info_is_retried() {
    let state = StubState {
        list_body_first: true,
        ..StubState::default()
    };
    let provider = provider_for(spawn_stub_provider(state.clone()).await);

    let attempt = provider.attempt(OAuthToken::bearer("stub-access-token"));
    let err = attempt.raw_info().await.unwrap_err();
    assert!(matches!(err, OAuthError::UserInfoFailed(_)));
    assert_eq!(state.user_info_hits.load(Ordering::SeqCst), 1);

    assert_eq!(attempt.uid().await.unwrap(), "b3c8a0d2");
    assert_eq!(state.user_info_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_provider() {
    // Nothing listens on the discard port
    let provider = provider_for("http://127.0.0.1:9".to_string());

    let attempt = provider.attempt(OAuthToken::bearer("stub-access-token"));
    assert!(matches!(
        attempt.uid().await,
        Err(OAuthError::UserInfoFailed(_))
    ));
}
