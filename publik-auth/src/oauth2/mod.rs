//! OAuth2 authentication module
//!
//! This module provides the Publik OAuth2/OpenID Connect provider:
//! - Endpoint URLs derived from the configured site
//! - Authorization URL generation with CSRF state and PKCE
//! - Authorization code exchange through the `oauth2` crate
//! - User-info retrieval, cached per authentication attempt
//! - Claim normalization into an [`IdentityRecord`]
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use publik_auth::config::PublikSettings;
//! use publik_auth::oauth2::{PublikProvider, RequestContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = PublikProvider::new(&PublikSettings {
//!     site: Some("https://connexion.publik.love".to_string()),
//!     client_id: std::env::var("PUBLIK_CLIENT_ID")?,
//!     client_secret: std::env::var("PUBLIK_CLIENT_SECRET")?,
//!     ..PublikSettings::default()
//! })?;
//!
//! // Request phase: redirect the browser to `auth_url`, keep state and verifier
//! let callback_url = provider.callback_url(&RequestContext::new("https://example.com", ""));
//! let (auth_url, csrf_state, pkce_verifier) = provider.authorization_url(&callback_url)?;
//!
//! // Callback phase: once the state has been checked by the host framework
//! # let code = "code-from-query";
//! let token = provider.exchange_code(code, &pkce_verifier, &callback_url).await?;
//! let auth_hash = provider.attempt(token).auth_hash().await?;
//! println!("signed in {} ({})", auth_hash.uid, auth_hash.info.email);
//! # let _ = (auth_url, csrf_state);
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! - **State Tokens**: CSRF state is random per request; validating it on the
//!   callback belongs to the host framework's session layer
//! - **PKCE**: Every authorization request carries an S256 challenge
//! - **Untrusted Claims**: User-info claims are provider controlled; an empty
//!   subject identifier must be treated as a failed sign-in

pub mod claims;
pub mod endpoints;
pub mod http;
pub mod providers;
pub mod types;

pub use claims::{ClaimProfile, IdentityInfo, IdentityRecord, RawClaims};
pub use endpoints::Endpoints;
pub use self::http::{ClaimsFetcher, ReqwestClaimsFetcher};
pub use providers::{AuthAttempt, AuthHash, Extra, PublikProvider};
pub use types::{Credentials, OAuthError, OAuthToken, RequestContext};
