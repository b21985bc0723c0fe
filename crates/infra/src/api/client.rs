//! Products API client with circuit breaker and retry logic
//!
//! Implements [`ProductCatalog`] over HTTP: each operation obtains a bearer
//! token, then sends one logical request through the resilience pipeline
//! built in [`super::sender`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use productdesk_common::resilience::{CircuitBreaker, CircuitBreakerConfig, Jitter, RetryConfig};
use productdesk_common::time::{Clock, SystemClock};
use productdesk_core::ProductCatalog;
use productdesk_domain::constants::PRODUCTS_RESOURCE;
use productdesk_domain::{
    Product, ProductDeskError, ProductId, ProductsConfig, ResilienceConfig, RetryJitter,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use super::auth::AccessTokenProvider;
use super::sender::{
    ApiRequest, ApiResponse, CircuitBreakerSender, HttpSender, RequestSender, RetrySender,
};
use crate::http::HttpClient;

/// Networked product catalog
pub struct ProductApiClient {
    base_url: Url,
    auth: Arc<dyn AccessTokenProvider>,
    sender: Arc<dyn RequestSender>,
}

impl std::fmt::Debug for ProductApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductApiClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

impl ProductApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ProductApiClientBuilder {
        ProductApiClientBuilder::default()
    }

    /// Base address every resource path is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> Result<Url, ProductDeskError> {
        self.resolve(PRODUCTS_RESOURCE)
    }

    fn item_url(&self, id: ProductId) -> Result<Url, ProductDeskError> {
        self.resolve(&format!("{PRODUCTS_RESOURCE}/{id}"))
    }

    fn resolve(&self, path: &str) -> Result<Url, ProductDeskError> {
        self.base_url
            .join(path)
            .map_err(|err| ProductDeskError::Config(format!("invalid resource path {path}: {err}")))
    }

    /// Obtain a token and send one logical request through the pipeline.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ProductDeskError> {
        let bearer_token = self.auth.access_token().await?;
        let request = ApiRequest { method, url, bearer_token, body };
        self.sender.send(&request).await
    }

    fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ProductDeskError> {
        serde_json::from_str(&response.body).map_err(|err| {
            ProductDeskError::Serialization(format!("failed to parse response: {err}"))
        })
    }

    fn encode(product: &Product) -> Result<serde_json::Value, ProductDeskError> {
        serde_json::to_value(product).map_err(|err| {
            ProductDeskError::Serialization(format!("failed to serialize product: {err}"))
        })
    }
}

#[async_trait]
impl ProductCatalog for ProductApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ProductDeskError> {
        let response = self.send(Method::GET, self.collection_url()?, None).await?;
        let products: Vec<Product> = Self::decode(&response)?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, ProductDeskError> {
        match self.send(Method::GET, self.item_url(id)?, None).await {
            Ok(response) => Self::decode(&response).map(Some),
            Err(err) if err.is_not_found_status() => {
                debug!("Product not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &Product) -> Result<(), ProductDeskError> {
        let body = Self::encode(product)?;
        self.send(Method::POST, self.collection_url()?, Some(body)).await?;

        info!("Product created");
        Ok(())
    }

    #[instrument(skip(self, product), fields(id = product.id))]
    async fn update_product(&self, product: &Product) -> Result<(), ProductDeskError> {
        let body = Self::encode(product)?;
        self.send(Method::PUT, self.item_url(product.id)?, Some(body)).await?;

        info!("Product updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), ProductDeskError> {
        self.send(Method::DELETE, self.item_url(id)?, None).await?;

        info!("Product deleted");
        Ok(())
    }
}

/// Parse a base address and make sure relative joins append to its path.
///
/// `https://host/api` and `https://host/api/` both resolve `Products` to
/// `https://host/api/Products`.
pub fn parse_base_address(address: &str) -> Result<Url, ProductDeskError> {
    let mut url = Url::parse(address.trim()).map_err(|err| {
        ProductDeskError::Config(format!("invalid products base address {address:?}: {err}"))
    })?;

    if url.cannot_be_a_base() {
        return Err(ProductDeskError::Config(format!(
            "products base address {address:?} cannot be used as a base URL"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Retry schedule derived from configuration: `max_retries` retries waiting
/// `backoff_base_seconds ^ n` seconds before retry `n`.
pub fn retry_config_from(config: &ResilienceConfig) -> Result<RetryConfig, ProductDeskError> {
    let jitter = match config.jitter {
        RetryJitter::None => Jitter::None,
        RetryJitter::Full => Jitter::Full,
        RetryJitter::Equal => Jitter::Equal,
    };
    RetryConfig::exponential_retries(config.max_retries, config.backoff_base_seconds, jitter)
        .map_err(|err| ProductDeskError::Config(err.message))
}

/// Breaker settings derived from configuration.
pub fn breaker_config_from(
    config: &ResilienceConfig,
) -> Result<CircuitBreakerConfig, ProductDeskError> {
    CircuitBreakerConfig::builder()
        .failure_threshold(config.failure_threshold)
        .success_threshold(1)
        .half_open_max_calls(1)
        .break_duration(Duration::from_secs(config.break_duration_seconds))
        .build()
        .map_err(|err| ProductDeskError::Config(err.to_string()))
}

/// Builder for [`ProductApiClient`]
#[derive(Default)]
pub struct ProductApiClientBuilder {
    base_address: Option<String>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    http: Option<HttpClient>,
    timeout: Option<Duration>,
    retry: Option<RetryConfig>,
    breaker: Option<CircuitBreakerConfig>,
}

impl ProductApiClientBuilder {
    /// Set the Products API base address
    pub fn base_address(mut self, address: impl Into<String>) -> Self {
        self.base_address = Some(address.into());
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Reuse an existing HTTP transport
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Per-request timeout used when no transport is supplied
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    pub fn circuit_breaker_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = Some(config);
        self
    }

    /// Apply the `products` and `resilience` configuration sections
    ///
    /// # Errors
    ///
    /// Returns `Config` if the resilience settings are invalid
    pub fn with_config(
        self,
        products: &ProductsConfig,
        resilience: &ResilienceConfig,
    ) -> Result<Self, ProductDeskError> {
        Ok(self
            .base_address(products.base_address.clone())
            .timeout(Duration::from_secs(products.timeout_seconds))
            .retry_config(retry_config_from(resilience)?)
            .circuit_breaker_config(breaker_config_from(resilience)?))
    }

    /// Build the API client using the system clock
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ProductApiClient, ProductDeskError> {
        self.build_with_clock(SystemClock)
    }

    /// Build the API client with a custom clock driving the circuit breaker
    pub fn build_with_clock<C: Clock>(self, clock: C) -> Result<ProductApiClient, ProductDeskError> {
        let address = self
            .base_address
            .ok_or_else(|| ProductDeskError::Config("Products base address not set".into()))?;
        let base_url = parse_base_address(&address)?;
        let auth =
            self.auth.ok_or_else(|| ProductDeskError::Config("Auth provider not set".into()))?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        let breaker = CircuitBreaker::with_clock(self.breaker.unwrap_or_default(), clock)
            .map_err(|err| {
                ProductDeskError::Config(format!("Failed to create circuit breaker: {err}"))
            })?;

        let sender = RetrySender::new(
            CircuitBreakerSender::new(HttpSender::new(http), breaker),
            self.retry.unwrap_or_default(),
        );

        Ok(ProductApiClient { base_url, auth, sender: Arc::new(sender) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticToken;

    #[async_trait]
    impl AccessTokenProvider for StaticToken {
        async fn access_token(&self) -> Result<String, ProductDeskError> {
            Ok("test-token".to_string())
        }
    }

    #[test]
    fn base_address_gets_trailing_slash() {
        let url = parse_base_address("https://products.example.com/api").unwrap();
        assert_eq!(url.join("Products/3").unwrap().as_str(), "https://products.example.com/api/Products/3");

        let url = parse_base_address("https://products.example.com/").unwrap();
        assert_eq!(url.join("Products").unwrap().as_str(), "https://products.example.com/Products");
    }

    #[test]
    fn invalid_base_address_is_config_error() {
        assert!(matches!(parse_base_address("not a url"), Err(ProductDeskError::Config(_))));
        assert!(matches!(parse_base_address("mailto:a@b.c"), Err(ProductDeskError::Config(_))));
    }

    #[test]
    fn resilience_config_maps_to_policies() {
        let retry = retry_config_from(&ResilienceConfig::default()).unwrap();
        assert_eq!(retry.max_attempts, 6);
        assert_eq!(retry.backoff.calculate_delay(4), Duration::from_secs(32));

        let breaker = breaker_config_from(&ResilienceConfig::default()).unwrap();
        assert_eq!(breaker.failure_threshold, 5);
        assert_eq!(breaker.break_duration, Duration::from_secs(30));
    }

    #[test]
    fn rejected_retry_schedule_is_config_error() {
        let config = ResilienceConfig { backoff_base_seconds: 0, ..Default::default() };
        let err = retry_config_from(&config).unwrap_err();
        assert_eq!(err, ProductDeskError::Config("exponential base must be greater than 0".into()));
    }

    #[test]
    fn configured_jitter_reaches_retry_policy() {
        let config = ResilienceConfig { jitter: RetryJitter::Full, ..Default::default() };
        assert_eq!(retry_config_from(&config).unwrap().jitter, Jitter::Full);
    }

    #[test]
    fn builder_requires_auth_and_address() {
        assert!(ProductApiClient::builder().auth(Arc::new(StaticToken)).build().is_err());
        assert!(ProductApiClient::builder().base_address("http://localhost").build().is_err());

        let client = ProductApiClient::builder()
            .base_address("http://localhost:8080")
            .auth(Arc::new(StaticToken))
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }
}
