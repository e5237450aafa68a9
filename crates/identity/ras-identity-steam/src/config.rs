//! Steam sign-in configuration.

use serde::{Deserialize, Serialize};

/// Steam's OpenID 2.0 endpoint, used both for the login redirect and for
/// `check_authentication` requests.
pub const STEAM_LOGIN_ENDPOINT: &str = "https://steamcommunity.com/openid/login";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamSignInConfig {
    pub login_endpoint: String,
    pub http_timeout_seconds: u64,
}

impl Default for SteamSignInConfig {
    fn default() -> Self {
        Self {
            login_endpoint: STEAM_LOGIN_ENDPOINT.to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl SteamSignInConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint = endpoint.into();
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_steam() {
        let config = SteamSignInConfig::new();
        assert_eq!(config.login_endpoint, STEAM_LOGIN_ENDPOINT);
        assert_eq!(config.http_timeout_seconds, 30);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: SteamSignInConfig =
            serde_json::from_str(r#"{ "http_timeout_seconds": 5 }"#).unwrap();
        assert_eq!(config.login_endpoint, STEAM_LOGIN_ENDPOINT);
        assert_eq!(config.http_timeout_seconds, 5);
    }
}
