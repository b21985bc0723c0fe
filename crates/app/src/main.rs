//! `productdesk` entry point
//!
//! This is a CLI, so `println!` and `eprintln!` are used for user-facing
//! output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use productdesk_app::{error_kind, execute, logging, Cli, Outcome};
use productdesk_infra::{build_catalog, config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // .env is optional; real environment variables take precedence
    let dotenv = dotenvy::dotenv();
    logging::init(cli.json_logs);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    match run(cli).await {
        Ok(Outcome::Output(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Missing(message)) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(kind = error_kind(&err), error = %err, "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = config::load_from(cli.config).context("loading configuration")?;
    let catalog = build_catalog(&config).context("building catalog")?;
    execute(catalog.as_ref(), cli.command).await
}
