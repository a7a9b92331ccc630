//! Core OAuth2 types and errors
//!
//! This module defines the foundational types shared by the Publik provider:
//! the configured client type, tokens, per-request context and errors.

use oauth2::basic::BasicClient;
use oauth2::{EndpointNotSet, EndpointSet};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Type alias for a configured OAuth2 client with auth and token endpoints set
///
/// The type parameters indicate which endpoints are configured:
/// - `EndpointSet` for `HasAuthUrl` - Authorization endpoint is configured
/// - `EndpointNotSet` for `HasDeviceAuthUrl` - Device auth not used
/// - `EndpointNotSet` for `HasIntrospectionUrl` - Token introspection not used
/// - `EndpointNotSet` for `HasRevocationUrl` - Token revocation not used
/// - `EndpointSet` for `HasTokenUrl` - Token exchange endpoint is configured
pub type ConfiguredClient = BasicClient<
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// OAuth2 access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token
    pub access_token: String,
    /// Refresh token (if provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// When the token expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<SystemTime>,
    /// OAuth2 scopes granted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl OAuthToken {
    /// Build a bearer token with no refresh token or expiry
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_at: None,
            scopes: None,
        }
    }

    /// Check if the access token has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires| SystemTime::now() > expires)
    }

    /// Credentials section handed to the host framework
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self
                .expires_at
                .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
                .map(|elapsed| elapsed.as_secs()),
            expires: self.expires_at.is_some(),
        }
    }
}

/// Token details exposed alongside the identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access token
    pub token: String,
    /// Refresh token (if provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    /// Whether the token expires at all
    pub expires: bool,
}

/// Request-derived values the host framework supplies for callback URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Scheme and authority of the incoming request, e.g. `https://example.com`
    pub full_host: String,
    /// Mount prefix of the application, empty when mounted at root
    pub script_name: String,
}

impl RequestContext {
    /// Create a request context
    pub fn new(full_host: impl Into<String>, script_name: impl Into<String>) -> Self {
        Self {
            full_host: full_host.into(),
            script_name: script_name.into(),
        }
    }
}

/// OAuth2 errors
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Required provider setting is missing
    #[error("{0}")]
    Configuration(String),

    /// A configured or derived URI cannot be parsed
    #[error("bad URI(is not URI?): {0:?}")]
    InvalidUri(String),

    /// Authorization code exchange failed
    #[error("Failed to exchange authorization code for token: {0}")]
    TokenExchangeFailed(String),

    /// Failed to fetch user info
    #[error("Failed to fetch user information: {0}")]
    UserInfoFailed(String),
}

impl OAuthError {
    /// Error raised when no site is configured
    #[must_use]
    pub fn missing_site() -> Self {
        Self::Configuration("site is required".to_string())
    }
}
