//! Products API client
//!
//! This module provides the HTTP-based catalog adapter. It handles
//! client-credentials authentication, the retry and circuit-breaker
//! pipeline, and JSON mapping of the five catalog operations.
//!
//! # Architecture
//!
//! - Uses the shared `HttpClient` (no direct reqwest in callers)
//! - Bearer token fetched lazily and cached until expiry
//! - Retry wraps circuit breaker wraps one HTTP attempt

pub mod auth;
pub mod client;
pub mod sender;

pub use auth::{credentials_from_config, AccessTokenProvider, ClientCredentialsAuthenticator};
pub use client::{
    breaker_config_from, parse_base_address, retry_config_from, ProductApiClient,
    ProductApiClientBuilder,
};
pub use sender::{
    ApiRequest, ApiResponse, CircuitBreakerSender, HttpSender, RequestSender, RetrySender,
};
