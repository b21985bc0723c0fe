//! Configuration structures
//!
//! Plain data deserialized from environment variables, JSON or TOML by
//! `productdesk_infra::config::loader`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_BASE_SECS, DEFAULT_BREAK_DURATION_SECS, DEFAULT_FAILURE_THRESHOLD,
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::{ProductDeskError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub products: ProductsConfig,
    #[serde(default)]
    pub resilience: ResilienceConfig,
}

impl Config {
    /// Check that everything the selected catalog needs is present.
    ///
    /// The in-memory catalog needs nothing; the networked client needs the
    /// full identity-provider block and a base address.
    ///
    /// # Errors
    /// Returns `ProductDeskError::Config` naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.products.use_fake {
            return Ok(());
        }

        let required = [
            ("auth.domain", &self.auth.domain),
            ("auth.client_id", &self.auth.client_id),
            ("auth.client_secret", &self.auth.client_secret),
            ("auth.audience", &self.auth.audience),
            ("products.base_address", &self.products.base_address),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ProductDeskError::Config(format!("{name} must not be empty")));
            }
        }

        if self.products.timeout_seconds == 0 {
            return Err(ProductDeskError::Config(
                "products.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        self.resilience.validate()
    }
}

/// Identity-provider settings for the client-credentials exchange
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity-provider domain, e.g. `tenant.eu.auth0.com`
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// API identifier the token is issued for
    #[serde(default)]
    pub audience: String,
    /// Full token endpoint URL; defaults to `https://{domain}/oauth/token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("audience", &self.audience)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Products API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsConfig {
    /// Base address of the Products API, e.g. `https://products.example.com/`
    #[serde(default)]
    pub base_address: String,
    /// Use the in-memory catalog instead of the remote API
    #[serde(default)]
    pub use_fake: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Connect directly, ignoring `HTTP_PROXY`/`HTTPS_PROXY`
    #[serde(default)]
    pub no_proxy: bool,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            base_address: String::new(),
            use_fake: false,
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            no_proxy: false,
        }
    }
}

/// Retry and circuit-breaker tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Retry `n` waits `backoff_base_seconds ^ n` seconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base_seconds: u64,
    /// Consecutive transient failures that open the breaker
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u64,
    /// How long the breaker stays open
    #[serde(default = "default_break_duration")]
    pub break_duration_seconds: u64,
    /// Randomization applied to each retry wait
    #[serde(default)]
    pub jitter: RetryJitter,
}

/// How retry waits are randomized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryJitter {
    /// Wait exactly the backoff delay
    #[default]
    None,
    /// Anywhere between zero and the delay
    Full,
    /// Between half the delay and the delay
    Equal,
}

impl ResilienceConfig {
    fn validate(&self) -> Result<()> {
        if self.backoff_base_seconds == 0 {
            return Err(ProductDeskError::Config(
                "resilience.backoff_base_seconds must be greater than 0".to_string(),
            ));
        }
        if self.failure_threshold == 0 {
            return Err(ProductDeskError::Config(
                "resilience.failure_threshold must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_seconds: DEFAULT_BACKOFF_BASE_SECS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            break_duration_seconds: DEFAULT_BREAK_DURATION_SECS,
            jitter: RetryJitter::None,
        }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_backoff_base() -> u64 {
    DEFAULT_BACKOFF_BASE_SECS
}

fn default_failure_threshold() -> u64 {
    DEFAULT_FAILURE_THRESHOLD
}

fn default_break_duration() -> u64 {
    DEFAULT_BREAK_DURATION_SECS
}
