//! Product catalog record

use serde::{Deserialize, Serialize};

/// Server-assigned product identifier
pub type ProductId = i64;

/// A product in the remote catalog.
///
/// The remote API is the source of truth; instances held by the client are
/// snapshots. `id` is assigned by the server on creation and ignored when
/// creating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "Id", default)]
    pub id: ProductId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Description", default)]
    pub description: String,
    #[serde(alias = "Price", default)]
    pub price: f64,
}

impl Product {
    /// Build a product that has not been persisted yet (`id` = 0).
    pub fn draft(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self { id: 0, name: name.into(), description: description.into(), price }
    }

    /// Same record with a different id.
    #[must_use]
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }
}
