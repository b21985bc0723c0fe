//! Command handlers

use anyhow::{Context, Result};
use productdesk_core::ProductCatalog;
use productdesk_domain::ProductDeskError;
use serde::Serialize;
use tracing::info;

use crate::cli::Command;

/// What a command produced for the terminal
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rendered JSON for stdout
    Output(String),
    /// Lookup found nothing; the process should exit non-zero
    Missing(String),
}

/// Run one command against the catalog.
///
/// # Errors
/// Propagates catalog failures with the command as context.
pub async fn execute(catalog: &dyn ProductCatalog, command: Command) -> Result<Outcome> {
    match command {
        Command::List => {
            let products = catalog.list_products().await.context("listing products")?;
            info!(count = products.len(), "Listed products");
            render(&products)
        }
        Command::Get { id } => match catalog.get_product(id).await.context("fetching product")? {
            Some(product) => render(&product),
            None => Ok(Outcome::Missing(format!("Product with ID {id} not found."))),
        },
        Command::Create(fields) => {
            let product = fields.into_product(0);
            catalog.create_product(&product).await.context("creating product")?;
            render(&serde_json::json!({ "created": product.name }))
        }
        Command::Update { id, fields } => {
            let product = fields.into_product(id);
            catalog.update_product(&product).await.context("updating product")?;
            render(&product)
        }
        Command::Delete { id } => {
            catalog.delete_product(id).await.context("deleting product")?;
            render(&serde_json::json!({ "deleted": id }))
        }
    }
}

/// Log label for a failed command: the catalog error kind, or `other` for
/// failures outside the catalog (configuration files, rendering).
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<ProductDeskError>().map_or("other", ProductDeskError::label)
}

fn render<T: Serialize + ?Sized>(value: &T) -> Result<Outcome> {
    let text = serde_json::to_string_pretty(value).context("rendering output")?;
    Ok(Outcome::Output(text))
}
