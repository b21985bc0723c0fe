//! Product catalog port

use async_trait::async_trait;
use productdesk_domain::{Product, ProductId, Result};

/// Five-operation CRUD contract over the product catalog.
///
/// Implemented by the networked Products API client and by the in-memory
/// fake; callers hold an `Arc<dyn ProductCatalog>` and never know which.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All products, in the order the catalog returns them
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// One product, or `None` when the catalog has no such id
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Create a product; `product.id` is ignored and assigned by the catalog
    async fn create_product(&self, product: &Product) -> Result<()>;

    /// Replace the product with id `product.id`
    async fn update_product(&self, product: &Product) -> Result<()>;

    /// Remove the product with the given id
    async fn delete_product(&self, id: ProductId) -> Result<()>;
}
