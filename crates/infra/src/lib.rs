//! # ProductDesk Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP transport and error conversions
//! - Client-credentials authenticator
//! - The resilient Products API client
//! - The in-memory catalog
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `productdesk-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod http;
pub mod products;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ClientCredentialsAuthenticator, ProductApiClient};
pub use catalog::build_catalog;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use products::InMemoryProductCatalog;
