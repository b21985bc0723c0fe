//! Product catalog ports

pub mod ports;

pub use ports::ProductCatalog;
