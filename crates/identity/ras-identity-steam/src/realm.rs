//! Realm canonicalization.
//!
//! A realm is the `scheme://host` part of a URL, lowercased, with any port and
//! path dropped. The realm given at construction must equal the realm derived
//! from the callback's `openid.return_to` for a login to be accepted.

use crate::error::{SteamAuthError, SteamAuthResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static REALM_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://[^:/]+)").expect("realm pattern is valid"));

/// Canonical `scheme://host` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Realm(String);

impl Realm {
    /// Canonicalize `input` into a realm.
    ///
    /// Fails with [`SteamAuthError::InvalidRealm`] when the input has no
    /// `http://host` or `https://host` prefix.
    pub fn parse(input: &str) -> SteamAuthResult<Self> {
        let prefix = REALM_PREFIX
            .captures(input)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| SteamAuthError::InvalidRealm(input.to_string()))?;

        Ok(Self(prefix.as_str().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Realm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
