//! publik-auth: OAuth2/OpenID Connect provider adapter for Publik
//!
//! Plugs the Publik identity provider into an application's sign-in flow:
//! - **Endpoints**: authorize, token and user-info URLs derived from one site
//! - **Token exchange**: delegated to the `oauth2` crate
//! - **Claims**: the user-info response normalized into an identity record
//!
//! Routing, session storage and account linkage stay with the host framework.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use publik_auth::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! publik_auth::observability::init()?;
//!
//! let config = PublikAuthConfig::load_for_service("my-app")?;
//! let provider = PublikProvider::new(&config.publik)?;
//!
//! let request = RequestContext::new("https://example.com", "");
//! println!("callback: {}", provider.callback_url(&request));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod oauth2;
pub mod observability;

pub mod prelude {
    //! Convenience re-exports for common types

    pub use crate::config::{PublikAuthConfig, PublikSettings};

    pub use crate::oauth2::{
        AuthAttempt, AuthHash, ClaimProfile, ClaimsFetcher, IdentityInfo, IdentityRecord,
        OAuthError, OAuthToken, PublikProvider, RawClaims, RequestContext,
    };
}
