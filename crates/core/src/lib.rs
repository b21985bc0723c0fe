//! # ProductDesk Core
//!
//! Port interfaces between the presentation layer and the catalog adapters.
//!
//! ## Architecture Principles
//! - Only depends on `productdesk-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod products;

pub use products::ports::ProductCatalog;
