//! Configuration management for publik-auth
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `PUBLIK_AUTH_` prefix)
//! 2. `./config.toml` (development)
//! 3. `~/.config/publik-auth/{service}/config.toml` (user config, XDG)
//! 4. `/etc/publik-auth/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [publik]
//! site = "https://connexion.publik.love"
//! client_id = "your-client-id"
//! client_secret = "your-client-secret"
//! scopes = ["openid", "email", "profile"]
//!
//! [publik.claims]
//! subject = "sub"
//! nickname = ["preferred_username"]
//! ```
//!
//! Nested keys are reachable from the environment with a double underscore,
//! e.g. `PUBLIK_AUTH_PUBLIK__SITE`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::oauth2::claims::ClaimProfile;

/// Publik provider settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublikSettings {
    /// Base origin of the identity provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// OAuth2 client ID
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Provider name, used in the callback path and the authentication result
    pub name: String,

    /// Prefix the host framework mounts provider routes under
    pub path_prefix: String,

    /// Callback path override, defaults to `{path_prefix}/{name}/callback`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_path: Option<String>,

    /// OAuth2 scopes to request
    pub scopes: Vec<String>,

    /// Claim mapping for the user-info response
    pub claims: ClaimProfile,
}

impl Default for PublikSettings {
    fn default() -> Self {
        Self {
            site: None,
            client_id: String::new(),
            client_secret: String::new(),
            name: "publik".to_string(),
            path_prefix: "/auth".to_string(),
            callback_path: None,
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            claims: ClaimProfile::default(),
        }
    }
}

impl fmt::Debug for PublikSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let client_secret = if self.client_secret.is_empty() {
            ""
        } else {
            "[REDACTED]"
        };

        f.debug_struct("PublikSettings")
            .field("site", &self.site)
            .field("client_id", &self.client_id)
            .field("client_secret", &client_secret)
            .field("name", &self.name)
            .field("path_prefix", &self.path_prefix)
            .field("callback_path", &self.callback_path)
            .field("scopes", &self.scopes)
            .field("claims", &self.claims)
            .finish()
    }
}

impl PublikSettings {
    /// Path the provider redirects back to
    #[must_use]
    pub fn callback_path(&self) -> String {
        self.callback_path
            .clone()
            .unwrap_or_else(|| format!("{}/{}/callback", self.path_prefix, self.name))
    }
}

/// Complete publik-auth configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PublikAuthConfig {
    /// Publik provider settings
    #[serde(default)]
    pub publik: PublikSettings,
}

impl PublikAuthConfig {
    /// Load configuration for a specific service
    ///
    /// Searches for configuration in XDG-compliant locations with precedence:
    /// 1. Environment variables (`PUBLIK_AUTH_*`, use `__` for nesting)
    /// 2. `./config.toml`
    /// 3. `~/.config/publik-auth/{service_name}/config.toml`
    /// 4. `/etc/publik-auth/{service_name}/config.toml`
    /// 5. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - Configuration file cannot be read or parsed
    /// - Configuration values fail type conversion
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            // 5. Start with defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        // 4. System config: /etc/publik-auth/{service_name}/config.toml
        let system_config = PathBuf::from("/etc/publik-auth")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        // 3. User config: ~/.config/publik-auth/{service_name}/config.toml
        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        // 2. Local config: ./config.toml
        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // 1. Environment variables (highest priority, double underscore for nesting)
        figment = figment.merge(Env::prefixed("PUBLIK_AUTH_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - Configuration file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            // Missing files are skipped by figment
            .merge(Toml::file(path))
            .merge(Env::prefixed("PUBLIK_AUTH_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("publik-auth")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}
