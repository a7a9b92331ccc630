//! HTTP plumbing for the Publik provider
//!
//! Token exchange goes through `oauth2`, which needs an async client adapter.
//! User-info requests go through the [`ClaimsFetcher`] trait so the provider can
//! be driven by any transport, with [`ReqwestClaimsFetcher`] as the default.

use async_trait::async_trait;
use url::Url;

use crate::oauth2::claims::RawClaims;
use crate::oauth2::types::OAuthError;

/// Errors raised by [`async_http_client`]
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The request could not be sent or its body read
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The response could not be rebuilt for `oauth2`
    #[error(transparent)]
    Response(#[from] http::Error),
}

/// Async HTTP client for OAuth2 token requests
///
/// Redirects are disabled as required by the OAuth2 specification. Request
/// headers are forwarded and the response body is fully buffered.
///
/// # Errors
///
/// Returns [`HttpClientError`] if the request fails or the response body cannot
/// be read.
pub async fn async_http_client(
    request: oauth2::HttpRequest,
) -> Result<oauth2::HttpResponse, HttpClientError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let method = request.method().clone();
    let url = request.uri().to_string();
    let headers = request.headers().clone();
    let body = request.into_body();

    let mut request_builder = client.request(method, &url).body(body);

    for (name, value) in &headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = request_builder.send().await?;

    let status_code = response.status();
    let headers = response.headers().to_owned();
    let body = response.bytes().await?.to_vec();

    let mut builder = http::Response::builder().status(status_code);
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }

    Ok(builder.body(body)?)
}

/// Authenticated GET returning the provider's user-info claims
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimsFetcher: Send + Sync {
    /// Fetch the claims at `url` on behalf of `access_token`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UserInfoFailed`] if the request fails, the provider
    /// answers with a non-success status or the body is not a JSON object.
    async fn fetch(&self, url: &Url, access_token: &str) -> Result<RawClaims, OAuthError>;
}

/// [`ClaimsFetcher`] backed by a shared `reqwest` client with bearer auth
#[derive(Debug, Clone, Default)]
pub struct ReqwestClaimsFetcher {
    http_client: reqwest::Client,
}

impl ReqwestClaimsFetcher {
    /// Create a fetcher with a fresh HTTP client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher reusing an existing HTTP client
    #[must_use]
    pub const fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ClaimsFetcher for ReqwestClaimsFetcher {
    async fn fetch(&self, url: &Url, access_token: &str) -> Result<RawClaims, OAuthError> {
        let response = self
            .http_client
            .get(url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::UserInfoFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::UserInfoFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::UserInfoFailed(format!("Failed to parse JSON: {e}")))
    }
}
