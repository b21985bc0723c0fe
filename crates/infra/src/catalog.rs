//! Catalog selection
//!
//! Chooses between the in-memory catalog and the networked Products API
//! client from configuration.

use std::sync::Arc;
use std::time::Duration;

use productdesk_core::ProductCatalog;
use productdesk_domain::{Config, Result};
use tracing::info;

use crate::api::{ClientCredentialsAuthenticator, ProductApiClient};
use crate::http::HttpClient;
use crate::products::InMemoryProductCatalog;

/// Build the catalog selected by `config.products.use_fake`.
///
/// The networked client and its authenticator share one HTTP transport.
///
/// # Errors
/// Returns `ProductDeskError::Config` if the configuration is incomplete or
/// the base address is not a valid URL.
pub fn build_catalog(config: &Config) -> Result<Arc<dyn ProductCatalog>> {
    config.validate()?;

    if config.products.use_fake {
        info!("Using in-memory product catalog");
        return Ok(Arc::new(InMemoryProductCatalog::seeded()));
    }

    let http = HttpClient::builder()
        .timeout(Duration::from_secs(config.products.timeout_seconds))
        .no_proxy(config.products.no_proxy)
        .build()?;
    let auth = Arc::new(ClientCredentialsAuthenticator::from_config(&config.auth, http.clone()));

    let client = ProductApiClient::builder()
        .with_config(&config.products, &config.resilience)?
        .http_client(http)
        .auth(auth)
        .build()?;

    info!(base_url = %client.base_url(), "Using Products API catalog");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use productdesk_domain::{AuthConfig, ProductDeskError, ProductsConfig};

    use super::*;

    #[tokio::test]
    async fn fake_flag_selects_in_memory_catalog() {
        let config = Config {
            products: ProductsConfig { use_fake: true, ..Default::default() },
            ..Default::default()
        };

        let catalog = build_catalog(&config).unwrap();
        assert_eq!(catalog.list_products().await.unwrap().len(), 10);
    }

    #[test]
    fn networked_catalog_requires_complete_config() {
        let result = build_catalog(&Config::default());
        assert!(matches!(result, Err(ProductDeskError::Config(_))));
    }

    #[test]
    fn networked_catalog_builds_from_config() {
        let config = Config {
            auth: AuthConfig {
                domain: "tenant.eu.auth0.com".into(),
                client_id: "id".into(),
                client_secret: "secret".into(),
                audience: "aud".into(),
                token_url: None,
            },
            products: ProductsConfig {
                base_address: "https://products.example.com".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(build_catalog(&config).is_ok());
    }
}
