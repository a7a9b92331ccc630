//! Publik OAuth2 provider implementation
//!
//! [`PublikProvider`] is built once from [`PublikSettings`] and shared across
//! requests. Each sign-in runs through its own [`AuthAttempt`], which owns the
//! access token and caches the user-info claims for that attempt only.

use std::borrow::Cow;
use std::sync::Arc;

use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::PublikSettings;
use crate::oauth2::claims::{ClaimProfile, IdentityInfo, IdentityRecord, RawClaims};
use crate::oauth2::endpoints::Endpoints;
use crate::oauth2::http::{async_http_client, ClaimsFetcher, ReqwestClaimsFetcher};
use crate::oauth2::types::{ConfiguredClient, Credentials, OAuthError, OAuthToken, RequestContext};

/// Publik OAuth2 provider
pub struct PublikProvider {
    name: String,
    client_id: String,
    client: ConfiguredClient,
    endpoints: Endpoints,
    callback_path: String,
    scopes: Vec<String>,
    claims: ClaimProfile,
    fetcher: Arc<dyn ClaimsFetcher>,
}

impl PublikProvider {
    /// Create a new Publik provider
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Configuration`] if no site is configured and
    /// [`OAuthError::InvalidUri`] if the site is not an absolute URI.
    pub fn new(settings: &PublikSettings) -> Result<Self, OAuthError> {
        let endpoints = Endpoints::resolve(settings.site.as_deref())?;

        let client = BasicClient::new(ClientId::new(settings.client_id.clone()))
            .set_client_secret(ClientSecret::new(settings.client_secret.clone()))
            .set_auth_uri(AuthUrl::from_url(endpoints.authorize_url().clone()))
            .set_token_uri(TokenUrl::from_url(endpoints.token_url().clone()));

        tracing::debug!(
            provider = %settings.name,
            site = %endpoints.site(),
            "Configured OAuth2 provider"
        );

        Ok(Self {
            name: settings.name.clone(),
            client_id: settings.client_id.clone(),
            client,
            callback_path: settings.callback_path(),
            scopes: settings.scopes.clone(),
            claims: settings.claims.clone(),
            endpoints,
            fetcher: Arc::new(ReqwestClaimsFetcher::new()),
        })
    }

    /// Replace the transport used for user-info requests
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ClaimsFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Provider name, also used in the callback path
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OAuth2 client ID
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Site and endpoint URLs the client talks to
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Claim mapping in use
    #[must_use]
    pub const fn claim_profile(&self) -> &ClaimProfile {
        &self.claims
    }

    /// Path the provider redirects back to, e.g. `/auth/publik/callback`
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Fully-qualified callback URL for the current request
    ///
    /// Host, mount prefix and callback path are concatenated verbatim.
    #[must_use]
    pub fn callback_url(&self, request: &RequestContext) -> String {
        format!(
            "{}{}{}",
            request.full_host, request.script_name, self.callback_path
        )
    }

    /// Generate authorization URL with CSRF state and PKCE
    ///
    /// Returns tuple of (authorization_url, csrf_state, pkce_verifier)
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidUri`] if `callback_url` is not a valid URL
    pub fn authorization_url(
        &self,
        callback_url: &str,
    ) -> Result<(String, String, String), OAuthError> {
        let redirect_url = redirect_url(callback_url)?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_url_builder = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(Cow::Owned(redirect_url));

        for scope in &self.scopes {
            auth_url_builder = auth_url_builder.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_state) = auth_url_builder
            .set_pkce_challenge(pkce_challenge)
            .url();

        Ok((
            auth_url.to_string(),
            csrf_state.secret().clone(),
            pkce_verifier.secret().clone(),
        ))
    }

    /// Exchange authorization code for access token
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] if the token endpoint rejects
    /// the code or cannot be reached.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
        callback_url: &str,
    ) -> Result<OAuthToken, OAuthError> {
        let redirect_url = redirect_url(callback_url)?;

        tracing::debug!(provider = %self.name, "Exchanging authorization code");

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .set_redirect_uri(Cow::Owned(redirect_url))
            .request_async(&async_http_client)
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed(e.to_string()))?;

        Ok(OAuthToken {
            access_token: token_response.access_token().secret().clone(),
            refresh_token: token_response
                .refresh_token()
                .map(|t| t.secret().clone()),
            token_type: AsRef::<str>::as_ref(token_response.token_type()).to_string(),
            expires_at: token_response.expires_in().map(|duration| {
                std::time::SystemTime::now() + std::time::Duration::from_secs(duration.as_secs())
            }),
            scopes: token_response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.to_string()).collect()),
        })
    }

    /// Start an authentication attempt for `token`
    #[must_use]
    pub fn attempt(&self, token: OAuthToken) -> AuthAttempt<'_> {
        AuthAttempt {
            provider: self,
            token,
            raw_info: OnceCell::new(),
        }
    }
}

fn redirect_url(callback_url: &str) -> Result<RedirectUrl, OAuthError> {
    RedirectUrl::new(callback_url.to_string())
        .map_err(|_| OAuthError::InvalidUri(callback_url.to_string()))
}

/// One run of the sign-in flow for one user
///
/// The user-info claims are fetched on first use and reused afterwards. An
/// attempt is not meant to outlive the callback request that created it.
pub struct AuthAttempt<'a> {
    provider: &'a PublikProvider,
    token: OAuthToken,
    raw_info: OnceCell<RawClaims>,
}

impl AuthAttempt<'_> {
    /// Access token of this attempt
    #[must_use]
    pub const fn token(&self) -> &OAuthToken {
        &self.token
    }

    /// User-info claims, fetched once per attempt
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UserInfoFailed`] if the claims cannot be fetched.
    /// Failures are not cached, a later call retries the request.
    pub async fn raw_info(&self) -> Result<&RawClaims, OAuthError> {
        self.raw_info
            .get_or_try_init(|| async {
                let url = self.provider.endpoints.user_info_url();
                tracing::debug!(provider = %self.provider.name, %url, "Fetching user info");
                self.provider.fetcher.fetch(url, &self.token.access_token).await
            })
            .await
    }

    /// Normalized identity
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UserInfoFailed`] if the claims cannot be fetched.
    pub async fn identity(&self) -> Result<IdentityRecord, OAuthError> {
        let identity = self.provider.claims.map(self.raw_info().await?);
        if identity.id.is_empty() {
            tracing::warn!(
                provider = %self.provider.name,
                claim = %self.provider.claims.subject,
                "User info has no subject identifier"
            );
        }
        Ok(identity)
    }

    /// Subject identifier
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UserInfoFailed`] if the claims cannot be fetched.
    pub async fn uid(&self) -> Result<String, OAuthError> {
        Ok(self.identity().await?.id)
    }

    /// Identity without the subject identifier
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UserInfoFailed`] if the claims cannot be fetched.
    pub async fn info(&self) -> Result<IdentityInfo, OAuthError> {
        Ok(self.identity().await?.info())
    }

    /// Complete authentication result for the host framework
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UserInfoFailed`] if the claims cannot be fetched.
    pub async fn auth_hash(&self) -> Result<AuthHash, OAuthError> {
        let identity = self.identity().await?;
        let raw_info = self.raw_info().await?.clone();

        tracing::info!(
            provider = %self.provider.name,
            uid = %identity.id,
            "OAuth2 authentication completed"
        );

        Ok(AuthHash {
            provider: self.provider.name.clone(),
            info: identity.info(),
            uid: identity.id,
            credentials: self.token.credentials(),
            extra: Extra { raw_info },
        })
    }
}

/// Authentication result handed to the host framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthHash {
    /// Provider name
    pub provider: String,
    /// Subject identifier
    pub uid: String,
    /// Normalized identity
    pub info: IdentityInfo,
    /// Token details
    pub credentials: Credentials,
    /// Provider payload
    pub extra: Extra,
}

/// Raw provider data kept alongside the normalized identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    /// Claims exactly as returned by the user-info endpoint
    pub raw_info: RawClaims,
}
