//! In-memory product catalog
//!
//! Offline stand-in for the Products API used during development. Seeded with
//! ten household appliances; nothing is persisted.

use async_trait::async_trait;
use parking_lot::RwLock;
use productdesk_core::ProductCatalog;
use productdesk_domain::{Product, ProductDeskError, ProductId, Result};
use tracing::debug;

/// Ordered, lock-guarded list of products
#[derive(Debug)]
pub struct InMemoryProductCatalog {
    products: RwLock<Vec<Product>>,
}

impl Default for InMemoryProductCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl InMemoryProductCatalog {
    /// Catalog holding the ten sample products (ids 1 to 10)
    pub fn seeded() -> Self {
        Self::with_products(seed_products())
    }

    /// Catalog holding exactly `products`, in order
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }

    /// An empty catalog
    pub fn empty() -> Self {
        Self::with_products(Vec::new())
    }

    fn not_found(id: ProductId) -> ProductDeskError {
        ProductDeskError::NotFound(format!("Product with ID {id} not found."))
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write();
        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        products.push(product.clone().with_id(id));
        debug!(id, "Created product in memory");
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write();
        let existing = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| Self::not_found(product.id))?;

        existing.name = product.name.clone();
        existing.description = product.description.clone();
        existing.price = product.price;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut products = self.products.write();
        let index =
            products.iter().position(|p| p.id == id).ok_or_else(|| Self::not_found(id))?;
        products.remove(index);
        Ok(())
    }
}

fn seed_products() -> Vec<Product> {
    [
        ("Microwave Oven", "1000W countertop microwave with multiple cooking presets", 89.99),
        ("Coffee Maker", "12-cup programmable coffee maker with auto shut-off", 49.99),
        ("Vacuum Cleaner", "Bagless upright vacuum with HEPA filter", 129.99),
        ("Toaster", "4-slice toaster with wide slots and bagel function", 34.99),
        ("Blender", "High-speed blender for smoothies and food processing", 79.99),
        ("Electric Kettle", "1.7L cordless electric kettle with auto shut-off", 29.99),
        ("Air Fryer", "Digital air fryer with multiple cooking functions", 99.99),
        ("Food Storage Containers", "Set of 10 BPA-free food storage containers with lids", 24.99),
        ("Dish Drying Rack", "Stainless steel 2-tier dish drying rack", 39.99),
        ("Slow Cooker", "6-litre programmable slow cooker with removable stoneware", 59.99),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, description, price), id)| Product::draft(name, description, price).with_id(id))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_with_ten_products_in_order() {
        let catalog = InMemoryProductCatalog::seeded();
        let products = catalog.list_products().await.unwrap();

        assert_eq!(products.len(), 10);
        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
        assert_eq!(products[0].name, "Microwave Oven");
        assert_eq!(products[9].name, "Slow Cooker");
    }

    #[tokio::test]
    async fn get_missing_product_is_none() {
        let catalog = InMemoryProductCatalog::seeded();
        assert_eq!(catalog.get_product(4).await.unwrap().unwrap().name, "Toaster");
        assert_eq!(catalog.get_product(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_assigns_max_plus_one() {
        let catalog = InMemoryProductCatalog::with_products(vec![
            Product::draft("a", "", 1.0).with_id(3),
            Product::draft("b", "", 2.0).with_id(17),
        ]);

        catalog.create_product(&Product::draft("c", "", 3.0).with_id(5)).await.unwrap();

        let products = catalog.list_products().await.unwrap();
        assert_eq!(products.last().unwrap().id, 18);
        assert_eq!(products.last().unwrap().name, "c");
    }

    #[tokio::test]
    async fn create_in_empty_catalog_starts_at_one() {
        let catalog = InMemoryProductCatalog::empty();
        catalog.create_product(&Product::draft("first", "", 1.0)).await.unwrap();
        assert!(catalog.get_product(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let catalog = InMemoryProductCatalog::seeded();
        catalog.update_product(&Product::draft("Kettle", "Glass kettle", 35.0).with_id(6)).await.unwrap();

        let kettle = catalog.get_product(6).await.unwrap().unwrap();
        assert_eq!(kettle.name, "Kettle");
        assert_eq!(kettle.description, "Glass kettle");
        assert_eq!(kettle.price, 35.0);
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let catalog = InMemoryProductCatalog::seeded();

        let err = catalog.update_product(&Product::draft("x", "", 1.0).with_id(42)).await.unwrap_err();
        assert_eq!(err, ProductDeskError::NotFound("Product with ID 42 not found.".into()));

        assert!(matches!(catalog.delete_product(42).await, Err(ProductDeskError::NotFound(_))));
        assert_eq!(catalog.list_products().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn delete_removes_product() {
        let catalog = InMemoryProductCatalog::seeded();
        catalog.delete_product(3).await.unwrap();

        assert_eq!(catalog.get_product(3).await.unwrap(), None);
        assert_eq!(catalog.list_products().await.unwrap().len(), 9);
    }
}
