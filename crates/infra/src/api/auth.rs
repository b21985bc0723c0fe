//! Client-credentials authentication with a shared token cache
//!
//! Exchanges the configured client id and secret for a bearer token at the
//! identity provider's `/oauth/token` endpoint and reuses it until it
//! expires. Refresh is lazy: it happens inside whichever call finds the cache
//! empty or stale.

use async_trait::async_trait;
use productdesk_common::auth::{CachedToken, ClientCredentialsConfig, TokenCache, TokenResponse};
use productdesk_common::time::{Clock, SystemClock};
use productdesk_domain::{AuthConfig, ProductDeskError};
use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use crate::http::HttpClient;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// This method should handle token refresh if needed.
    async fn access_token(&self) -> Result<String, ProductDeskError>;
}

/// OAuth 2.0 client-credentials authenticator
///
/// Owns a [`TokenCache`]; concurrent callers on a cold cache may each fetch a
/// token, and whichever stores last wins.
pub struct ClientCredentialsAuthenticator<C: Clock = SystemClock> {
    http: HttpClient,
    credentials: ClientCredentialsConfig,
    cache: TokenCache<C>,
}

impl ClientCredentialsAuthenticator<SystemClock> {
    /// Create an authenticator with an empty cache and the system clock
    pub fn new(credentials: ClientCredentialsConfig, http: HttpClient) -> Self {
        Self::with_cache(credentials, http, TokenCache::new())
    }

    /// Build from the `auth` section of the configuration
    pub fn from_config(config: &AuthConfig, http: HttpClient) -> Self {
        Self::new(credentials_from_config(config), http)
    }
}

impl<C: Clock> ClientCredentialsAuthenticator<C> {
    /// Create an authenticator around an existing cache
    ///
    /// Tests pass a cache built on a `MockClock` to control expiry.
    pub fn with_cache(
        credentials: ClientCredentialsConfig,
        http: HttpClient,
        cache: TokenCache<C>,
    ) -> Self {
        Self { http, credentials, cache }
    }

    /// The token cache used by this authenticator
    pub fn cache(&self) -> &TokenCache<C> {
        &self.cache
    }

    /// Return the cached token, fetching a new one when absent or expired.
    ///
    /// # Errors
    ///
    /// `Auth` when the exchange answers non-2xx or the body is malformed,
    /// `Transport` when the identity provider cannot be reached.
    pub async fn refresh_if_needed(&self) -> Result<String, ProductDeskError> {
        if let Some(token) = self.cache.get() {
            debug!("Using cached access token");
            return Ok(token);
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        self.cache.store(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call performs a fresh exchange.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    #[instrument(skip(self), fields(token_url = %self.credentials.token_url()))]
    async fn fetch_token(&self) -> Result<CachedToken, ProductDeskError> {
        let request = self
            .http
            .request(Method::POST, self.credentials.token_url())
            .form(&self.credentials.form_params());

        let response = self.http.send(request).await?;
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            ProductDeskError::Transport(format!("failed to read token response body: {err}"))
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Token exchange rejected");
            debug!(body = %body, "Token endpoint error body");
            return Err(ProductDeskError::auth(Some(status.as_u16()), body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            ProductDeskError::auth(
                Some(status.as_u16()),
                format!("malformed token response: {err}"),
            )
        })?;

        let token = CachedToken::from_response(parsed, self.cache.clock().utc_now())
            .ok_or_else(|| ProductDeskError::auth(Some(status.as_u16()), "invalid expires_in"))?;
        info!(expires_at = %token.expires_at, "Obtained access token");
        Ok(token)
    }
}

#[async_trait]
impl<C: Clock> AccessTokenProvider for ClientCredentialsAuthenticator<C> {
    async fn access_token(&self) -> Result<String, ProductDeskError> {
        self.refresh_if_needed().await
    }
}

/// Map the configuration section onto the client-credentials settings.
pub fn credentials_from_config(config: &AuthConfig) -> ClientCredentialsConfig {
    let credentials = ClientCredentialsConfig::new(
        config.domain.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
        config.audience.clone(),
    );
    match &config.token_url {
        Some(url) => credentials.with_token_url(url.clone()),
        None => credentials,
    }
}
