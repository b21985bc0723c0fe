use std::time::Duration;

use productdesk_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use productdesk_domain::ProductDeskError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("productdesk/", env!("CARGO_PKG_VERSION"));

/// HTTP transport with a per-request timeout.
///
/// Sends each request exactly once. Retries and circuit breaking are layered
/// on top by `api::sender`, so this type never repeats a request itself.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request once.
    ///
    /// Any response, including non-2xx, is returned as `Ok`; only failures
    /// before a response arrives become `Transport` errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ProductDeskError> {
        let request = builder.build().map_err(|err| ProductDeskError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    no_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS), no_proxy: false }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` and connect directly.
    ///
    /// Off by default: the system proxy settings apply.
    pub fn no_proxy(mut self, no_proxy: bool) -> Self {
        self.no_proxy = no_proxy;
        self
    }

    pub fn build(self) -> Result<HttpClient, ProductDeskError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).user_agent(USER_AGENT);
        if self.no_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|err| ProductDeskError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}
