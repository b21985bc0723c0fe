//! Request pipeline for the Products API
//!
//! One attempt is performed by [`HttpSender`]. Resilience is added by
//! wrapping it:
//!
//! ```text
//! RetrySender ──► CircuitBreakerSender ──► HttpSender ──► network
//! ```
//!
//! Every attempt the retry layer makes passes through the breaker, so once
//! the breaker opens the remaining retries fail fast with `CircuitOpen`,
//! which is never retried.

use std::sync::Arc;

use async_trait::async_trait;
use productdesk_common::resilience::policies::PredicateRetry;
use productdesk_common::resilience::{
    CircuitBreaker, CircuitState, ResilienceError, RetryConfig, RetryError, RetryExecutor,
};
use productdesk_common::time::{Clock, SystemClock};
use productdesk_domain::ProductDeskError;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Method;
use tracing::{debug, warn};
use url::Url;

use crate::http::HttpClient;

/// A single Products API call, ready to be sent any number of times
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub bearer_token: String,
    pub body: Option<serde_json::Value>,
}

/// A successful (2xx) response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Something that can perform an [`ApiRequest`]
///
/// Implementations return `Ok` only for 2xx responses; any other status is
/// an `Api` error carrying the status and body.
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ProductDeskError>;
}

#[async_trait]
impl<S: RequestSender + ?Sized> RequestSender for Arc<S> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ProductDeskError> {
        (**self).send(request).await
    }
}

/// Performs exactly one HTTP attempt
#[derive(Debug, Clone)]
pub struct HttpSender {
    http: HttpClient,
}

impl HttpSender {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RequestSender for HttpSender {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ProductDeskError> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", request.bearer_token))
            .header(ACCEPT, "application/json");

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            ProductDeskError::Transport(format!("failed to read response body: {err}"))
        })?;

        if status.is_success() {
            Ok(ApiResponse { status: status.as_u16(), body })
        } else {
            debug!(status = status.as_u16(), body = %body, "Products API error body");
            Err(ProductDeskError::api(status.as_u16(), body))
        }
    }
}

/// Guards the inner sender with a circuit breaker
///
/// Only transient failures (transport errors, 5xx, 408) count against the
/// breaker; 404 and other client errors count as successes.
pub struct CircuitBreakerSender<S, C: Clock = SystemClock> {
    inner: S,
    breaker: CircuitBreaker<C>,
}

impl<S, C: Clock> CircuitBreakerSender<S, C> {
    pub fn new(inner: S, breaker: CircuitBreaker<C>) -> Self {
        Self { inner, breaker }
    }

    pub fn state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn breaker(&self) -> &CircuitBreaker<C> {
        &self.breaker
    }
}

#[async_trait]
impl<S: RequestSender, C: Clock> RequestSender for CircuitBreakerSender<S, C> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ProductDeskError> {
        self.breaker
            .execute_with(|| self.inner.send(request), ProductDeskError::is_transient)
            .await
            .map_err(|err| match err {
                ResilienceError::CircuitOpen => {
                    warn!(url = %request.url, "Circuit open, request rejected");
                    ProductDeskError::CircuitOpen
                }
                ResilienceError::OperationFailed { source } => source,
            })
    }
}

/// Retries the inner sender with backoff
///
/// Retries transient failures and 404; everything else, including
/// `CircuitOpen`, propagates after the first occurrence.
pub struct RetrySender<S> {
    inner: S,
    executor: RetryExecutor<PredicateRetry<fn(&ProductDeskError) -> bool>>,
}

impl<S> RetrySender<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        let policy: PredicateRetry<fn(&ProductDeskError) -> bool> =
            PredicateRetry::new(ProductDeskError::is_retryable);
        Self { inner, executor: RetryExecutor::new(config, policy) }
    }

    pub fn config(&self) -> &RetryConfig {
        self.executor.config()
    }
}

#[async_trait]
impl<S: RequestSender> RequestSender for RetrySender<S> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ProductDeskError> {
        self.executor.execute(|| self.inner.send(request)).await.map_err(RetryError::into_source)
    }
}
