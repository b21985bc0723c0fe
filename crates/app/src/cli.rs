//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use productdesk_domain::{Product, ProductId};

#[derive(Debug, Parser)]
#[command(name = "productdesk")]
#[command(about = "Manage the product catalog through the Products API", long_about = None)]
pub struct Cli {
    /// Configuration file (`.json` or `.toml`); environment and standard
    /// locations are used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// List every product
    List,
    /// Show one product
    Get {
        id: ProductId,
    },
    /// Add a product; the server assigns its id
    Create(ProductFields),
    /// Replace the product with the given id
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Remove a product
    Delete {
        id: ProductId,
    },
}

#[derive(Debug, Args, PartialEq)]
pub struct ProductFields {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub price: f64,
}

impl ProductFields {
    pub fn into_product(self, id: ProductId) -> Product {
        Product::draft(self.name, self.description, self.price).with_id(id)
    }
}
