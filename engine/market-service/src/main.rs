//! Fantasy Market CLI
//!
//! Loads configuration, sets up logging and metrics, then runs one query
//! command and prints its JSON result.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use market_service::cli::{Cli, CliHandler};
use market_service::{initialize_logging, initialize_metrics, load_configuration};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    initialize_logging(&config.logging)?;
    info!("Starting fantasy-market v{}", env!("CARGO_PKG_VERSION"));

    initialize_metrics(&config.metrics)?;

    let handler = CliHandler::new(config).context("Failed to initialize")?;
    handler.handle_command(cli.command).await
}
