//! # ProductDesk CLI
//!
//! Operator command line over the product catalog. The binary in
//! `main.rs` wires configuration, logging and the catalog factory; the
//! command handlers live here so they can run against any
//! [`ProductCatalog`](productdesk_core::ProductCatalog).

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::{error_kind, execute, Outcome};
