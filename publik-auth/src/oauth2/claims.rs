//! Claim normalization
//!
//! Turns the provider's raw user-info claims into an [`IdentityRecord`].
//! Which claim feeds which field is described by a [`ClaimProfile`], so a new
//! provider response shape is a configuration change rather than a new mapper.
//!
//! Mapping never fails: missing or unusable claims degrade to empty strings and
//! the caller decides whether an empty `id` or `email` is acceptable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Claims as returned by the user-info endpoint
///
/// Provider controlled and untrusted; any key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawClaims(Map<String, Value>);

impl RawClaims {
    /// Create an empty claim set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Textual value of a claim
    ///
    /// Strings are returned verbatim, numbers and booleans are rendered as text.
    /// Null, arrays and objects count as absent.
    #[must_use]
    pub fn text(&self, claim: &str) -> Option<Cow<'_, str>> {
        match self.0.get(claim)? {
            Value::String(value) => Some(Cow::Borrowed(value.as_str())),
            Value::Number(value) => Some(Cow::Owned(value.to_string())),
            Value::Bool(value) => Some(Cow::Owned(value.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Textual value of an optional claim name, empty when absent
    fn text_or_empty(&self, claim: Option<&str>) -> Cow<'_, str> {
        claim
            .and_then(|claim| self.text(claim))
            .unwrap_or(Cow::Borrowed(""))
    }

    /// Number of claims present
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no claims are present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawClaims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawClaims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Which claims feed which identity field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimProfile {
    /// Claim holding the stable subject identifier
    pub subject: String,
    /// Claim holding the email address
    pub email: String,
    /// Claim holding a ready-made display name, preferred over given/family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Claim holding the given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Claim holding the family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Nickname claims in order of preference; falls back to the display name
    pub nickname: Vec<String>,
    /// Claim holding the avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ClaimProfile {
    /// Claims served by Publik's OpenID Connect user-info endpoint
    #[must_use]
    pub fn publik_oidc() -> Self {
        Self {
            subject: "sub".to_string(),
            email: "email".to_string(),
            name: None,
            given_name: Some("given_name".to_string()),
            family_name: Some("family_name".to_string()),
            nickname: vec!["preferred_username".to_string()],
            image: Some("image".to_string()),
        }
    }

    /// Older Publik response shape carrying `id`, `name` and `nickname` directly
    #[must_use]
    pub fn publik_legacy() -> Self {
        Self {
            subject: "id".to_string(),
            email: "email".to_string(),
            name: Some("name".to_string()),
            given_name: None,
            family_name: None,
            nickname: vec!["nickname".to_string()],
            image: Some("image".to_string()),
        }
    }

    /// Normalize `claims` into an identity record
    #[must_use]
    pub fn map(&self, claims: &RawClaims) -> IdentityRecord {
        let name = self.display_name(claims);
        let nickname = self
            .nickname
            .iter()
            .filter_map(|claim| claims.text(claim))
            .find(|nickname| !nickname.is_empty())
            .map_or_else(|| name.clone(), Cow::into_owned);

        IdentityRecord {
            id: claims.text_or_empty(Some(self.subject.as_str())).into_owned(),
            email: claims.text_or_empty(Some(self.email.as_str())).to_lowercase(),
            name,
            nickname,
            image: claims.text_or_empty(self.image.as_deref()).into_owned(),
        }
    }

    fn display_name(&self, claims: &RawClaims) -> String {
        if let Some(name) = self.name.as_deref().and_then(|claim| claims.text(claim)) {
            if !name.is_empty() {
                return name.into_owned();
            }
        }

        let given = claims.text_or_empty(self.given_name.as_deref());
        let family = claims.text_or_empty(self.family_name.as_deref());
        format!("{given} {family}").trim().to_string()
    }
}

impl Default for ClaimProfile {
    fn default() -> Self {
        Self::publik_oidc()
    }
}

/// Normalized identity handed to the host framework
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Stable subject identifier, empty when the provider sent none
    pub id: String,
    /// Lower-cased email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Short name, falls back to the display name
    pub nickname: String,
    /// Avatar URL
    pub image: String,
}

impl IdentityRecord {
    /// Everything but the subject identifier
    #[must_use]
    pub fn info(&self) -> IdentityInfo {
        IdentityInfo {
            email: self.email.clone(),
            name: self.name.clone(),
            nickname: self.nickname.clone(),
            image: self.image.clone(),
        }
    }
}

/// The `info` section of an authentication result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    /// Lower-cased email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Short name
    pub nickname: String,
    /// Avatar URL
    pub image: String,
}
