//! OAuth2 provider implementations
//!
//! Currently the Publik identity provider, configured from a single site.

pub mod publik;

pub use publik::{AuthAttempt, AuthHash, Extra, PublikProvider};
