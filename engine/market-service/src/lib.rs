//! Fantasy Market Service Library
//!
//! Assembles market status snapshots from the week resolver, market clock and
//! lock engine, and provides the configuration, logging and CLI plumbing for
//! the `fantasy-market` binary.

use anyhow::{Context, Result};
use std::path::Path;

pub mod cli;
pub mod config;
pub mod logging;
pub mod projections;
pub mod status;

pub use config::ServiceConfig;
pub use logging::initialize_logging;
pub use projections::{weekly_line, PlayerProjection};
pub use status::{MarketStatus, MarketStatusAssembler, TrackedPlayer};

/// Load configuration from an optional file and environment variables
pub fn load_configuration(path: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(path).context("Failed to load service configuration")
}

/// Install the Prometheus exporter when metrics are enabled
pub fn initialize_metrics(config: &config::MetricsConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.port))
        .install()
        .context("Failed to install Prometheus exporter")?;

    tracing::info!("Prometheus metrics exposed on port {}", config.port);
    Ok(())
}
