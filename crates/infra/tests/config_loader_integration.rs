//! Integration tests for configuration loading and catalog selection.

use std::io::Write;

use productdesk_core::ProductCatalog;
use productdesk_infra::{build_catalog, config};
use tempfile::Builder;

#[tokio::test]
async fn toml_file_with_fake_flag_builds_seeded_catalog() {
    let mut file = Builder::new().suffix(".toml").tempfile().expect("temp file");
    file.write_all(b"[products]\nuse_fake = true\n").expect("write config");

    let config = config::load_from(Some(file.path().to_path_buf())).expect("config");
    let catalog = build_catalog(&config).expect("catalog");

    let products = catalog.list_products().await.expect("products");
    assert_eq!(products.len(), 10);
    assert_eq!(products[6].name, "Air Fryer");
}

#[test]
fn json_file_with_networked_settings_builds_client() {
    let mut file = Builder::new().suffix(".json").tempfile().expect("temp file");
    file.write_all(
        br#"{
            "auth": {
                "domain": "tenant.eu.auth0.com",
                "client_id": "client",
                "client_secret": "secret",
                "audience": "https://products.example.com"
            },
            "products": { "base_address": "https://products.example.com/api", "timeout_seconds": 5 },
            "resilience": { "max_retries": 3, "backoff_base_seconds": 1 }
        }"#,
    )
    .expect("write config");

    let config = config::load_from(Some(file.path().to_path_buf())).expect("config");
    assert_eq!(config.products.timeout_seconds, 5);
    assert_eq!(config.resilience.max_retries, 3);
    assert!(build_catalog(&config).is_ok());
}
