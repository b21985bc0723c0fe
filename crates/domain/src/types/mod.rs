//! Domain data types

pub mod product;

pub use product::{Product, ProductId};
