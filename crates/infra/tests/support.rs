//! Shared fixtures for Products API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use productdesk_common::auth::ClientCredentialsConfig;
use productdesk_common::resilience::RetryConfig;
use productdesk_infra::api::ProductApiClientBuilder;
use productdesk_infra::{ClientCredentialsAuthenticator, HttpClient, ProductApiClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "integration-token";

/// Mount a token endpoint that must be hit exactly `expected_calls` times.
pub async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "Bearer",
            "expires_in": 86400
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Retry schedule with the production attempt budget but millisecond waits.
pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig::builder()
        .max_attempts(max_attempts)
        .fixed_backoff(Duration::from_millis(1))
        .build()
        .expect("valid retry config")
}

/// Builder pointed at `server` for both the token endpoint and the API.
pub fn client_builder(server: &MockServer) -> ProductApiClientBuilder {
    let credentials = ClientCredentialsConfig::new("unused", "client", "secret", "products-api")
        .with_token_url(format!("{}/oauth/token", server.uri()));
    let http = HttpClient::builder().no_proxy(true).build().expect("http client");
    let auth = Arc::new(ClientCredentialsAuthenticator::new(credentials, http.clone()));

    ProductApiClient::builder().base_address(server.uri()).http_client(http).auth(auth)
}

/// Client with the default six-attempt budget and fast backoff.
pub fn client(server: &MockServer) -> ProductApiClient {
    client_builder(server).retry_config(fast_retry(6)).build().expect("client")
}

/// Client that never retries.
pub fn single_attempt_client(server: &MockServer) -> ProductApiClient {
    client_builder(server).retry_config(fast_retry(1)).build().expect("client")
}
