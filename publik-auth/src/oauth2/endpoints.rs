//! Endpoint resolution from the configured Publik site
//!
//! Publik serves its OpenID Connect endpoints at fixed paths below the site
//! root. The paths are joined onto the site with standard URI-join semantics,
//! so any path on the configured site is replaced rather than extended.

use url::Url;

use crate::oauth2::types::OAuthError;

/// Path of the authorization endpoint
pub const AUTHORIZE_PATH: &str = "/idp/oidc/authorize/";
/// Path of the token endpoint
pub const TOKEN_PATH: &str = "/idp/oidc/token/";
/// Path of the user-info endpoint
pub const USER_INFO_PATH: &str = "/idp/oidc/user_info/";

/// Endpoint URLs derived from a single site origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    site: String,
    authorize_url: Url,
    token_url: Url,
    user_info_url: Url,
}

impl Endpoints {
    /// Derive the endpoint URLs from `site`
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Configuration`] when `site` is unset or blank, and
    /// [`OAuthError::InvalidUri`] when it is not an absolute URI with a host.
    pub fn resolve(site: Option<&str>) -> Result<Self, OAuthError> {
        let site = site
            .filter(|site| !site.trim().is_empty())
            .ok_or_else(OAuthError::missing_site)?;

        // The URL parser silently strips whitespace and control characters
        if site
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(OAuthError::InvalidUri(site.to_string()));
        }

        let base = Url::parse(site).map_err(|_| OAuthError::InvalidUri(site.to_string()))?;
        if !base.has_host() {
            return Err(OAuthError::InvalidUri(site.to_string()));
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|_| OAuthError::InvalidUri(site.to_string()))
        };

        Ok(Self {
            site: site.to_string(),
            authorize_url: join(AUTHORIZE_PATH)?,
            token_url: join(TOKEN_PATH)?,
            user_info_url: join(USER_INFO_PATH)?,
        })
    }

    /// The site exactly as configured
    #[must_use]
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Authorization endpoint
    #[must_use]
    pub const fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    /// Token endpoint
    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// User-info endpoint
    #[must_use]
    pub const fn user_info_url(&self) -> &Url {
        &self.user_info_url
    }
}
