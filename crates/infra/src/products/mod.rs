//! Product catalog adapters that need no network

pub mod fake;

pub use fake::InMemoryProductCatalog;
