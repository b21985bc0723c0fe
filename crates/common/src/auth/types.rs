//! OAuth 2.0 client-credentials types
//!
//! Wire formats for the token endpoint and the cached token derived from a
//! successful exchange.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Client-credentials grant type
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// OAuth token response from the authorization server
///
/// Standard OAuth 2.0 token response (RFC 6749 §5.1) as returned by
/// `/oauth/token` for a client-credentials exchange.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// A bearer token together with its computed expiry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Build a cached token issued at `issued_at`; expiry is
    /// `issued_at + expires_in`.
    ///
    /// Returns `None` when `expires_in` is negative or the expiry does not
    /// fit in a timestamp.
    #[must_use]
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Option<Self> {
        if response.expires_in < 0 {
            return None;
        }
        let expires_at = TimeDelta::try_seconds(response.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))?;

        Some(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
        })
    }

    /// `true` while `now` is strictly before the expiry.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Client-credentials settings for one authorization server
///
/// Supports Auth0-style servers where the token endpoint lives at
/// `https://{domain}/oauth/token`.
#[derive(Clone)]
pub struct ClientCredentialsConfig {
    /// Authorization server domain (e.g., "tenant.eu.auth0.com")
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// API identifier the token is issued for
    pub audience: String,
    /// Explicit token endpoint, overriding the one derived from `domain`
    pub token_url: Option<String>,
}

impl ClientCredentialsConfig {
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            audience: audience.into(),
            token_url: None,
        }
    }

    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    /// Get the token URL
    ///
    /// `https://{domain}/oauth/token` unless overridden.
    #[must_use]
    pub fn token_url(&self) -> String {
        match &self.token_url {
            Some(url) => url.clone(),
            None => format!("https://{}/oauth/token", self.domain.trim_end_matches('/')),
        }
    }

    /// Form fields for the token request, in wire order.
    #[must_use]
    pub fn form_params(&self) -> [(&'static str, &str); 4] {
        [
            ("grant_type", CLIENT_CREDENTIALS_GRANT),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("audience", self.audience.as_str()),
        ]
    }
}

impl fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("audience", &self.audience)
            .field("token_url", &self.token_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn response(expires_in: i64) -> TokenResponse {
        TokenResponse {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }

    #[test]
    fn token_response_defaults_token_type() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":86400}"#).unwrap();
        assert_eq!(parsed.token_type, "Bearer");
        assert_eq!(parsed.expires_in, 86400);
    }

    #[test]
    fn cached_token_expires_after_lifetime() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let token = CachedToken::from_response(response(3600), issued).unwrap();

        assert!(token.is_valid_at(issued));
        assert!(token.is_valid_at(issued + TimeDelta::seconds(3599)));
        assert!(!token.is_valid_at(issued + TimeDelta::seconds(3600)));
    }

    #[test]
    fn zero_lifetime_token_is_never_valid() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert!(!CachedToken::from_response(response(0), issued).unwrap().is_valid_at(issued));
    }

    #[test]
    fn out_of_range_lifetime_is_rejected() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert!(CachedToken::from_response(response(-1), issued).is_none());
        assert!(CachedToken::from_response(response(i64::MAX), issued).is_none());
        assert!(CachedToken::from_response(response(i64::MAX / 1000), issued).is_none());
    }

    #[test]
    fn token_url_derived_from_domain_or_overridden() {
        let config = ClientCredentialsConfig::new("tenant.eu.auth0.com", "id", "secret", "aud");
        assert_eq!(config.token_url(), "https://tenant.eu.auth0.com/oauth/token");

        let config = config.with_token_url("http://127.0.0.1:9999/oauth/token");
        assert_eq!(config.token_url(), "http://127.0.0.1:9999/oauth/token");
    }

    #[test]
    fn form_params_carry_grant_and_credentials() {
        let config = ClientCredentialsConfig::new("d", "id", "secret", "aud");
        assert_eq!(
            config.form_params(),
            [
                ("grant_type", "client_credentials"),
                ("client_id", "id"),
                ("client_secret", "secret"),
                ("audience", "aud"),
            ]
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = ClientCredentialsConfig::new("d", "id", "hunter2", "aud");
        assert!(!format!("{config:?}").contains("hunter2"));
        assert!(!format!("{:?}", response(1)).contains("abc"));
    }
}
