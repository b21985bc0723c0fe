//! Conversions from external infrastructure errors into domain errors.

use productdesk_domain::ProductDeskError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ProductDeskError);

impl From<InfraError> for ProductDeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ProductDeskError> for InfraError {
    fn from(value: ProductDeskError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoProductDeskError {
    fn into_productdesk(self) -> ProductDeskError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ProductDeskError */
/* -------------------------------------------------------------------------- */

impl IntoProductDeskError for HttpError {
    fn into_productdesk(self) -> ProductDeskError {
        if self.is_decode() {
            return ProductDeskError::Serialization(format!("failed to decode response: {self}"));
        }

        if self.is_builder() {
            return ProductDeskError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return ProductDeskError::Transport("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ProductDeskError::Transport(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            return ProductDeskError::api(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status"),
            );
        }

        ProductDeskError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_productdesk())
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(ProductDeskError::Serialization(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn direct() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn error_for_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::BAD_GATEWAY.as_u16()))
            .mount(&server)
            .await;

        let err = direct()
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();

        let mapped: ProductDeskError = InfraError::from(err).into();
        assert_eq!(mapped, ProductDeskError::api(502, "Bad Gateway"));
        assert!(mapped.is_transient());
    }

    #[tokio::test]
    async fn decode_failure_maps_to_serialization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = direct()
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap_err();

        let mapped: ProductDeskError = InfraError::from(err).into();
        assert!(matches!(mapped, ProductDeskError::Serialization(_)));
    }

    #[tokio::test]
    async fn connect_failure_maps_to_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = direct().get(format!("http://{addr}")).send().await.unwrap_err();
        let mapped: ProductDeskError = InfraError::from(err).into();

        assert!(matches!(mapped, ProductDeskError::Transport(_)));
        assert!(mapped.is_transient());
    }

    #[test]
    fn json_error_maps_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let mapped: ProductDeskError = InfraError::from(err).into();
        assert!(matches!(mapped, ProductDeskError::Serialization(_)));
    }
}
