//! Service configuration management
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! then `FANTASY_MARKET__*` environment variables (`__` separates nesting, e.g.
//! `FANTASY_MARKET__SLEEPER__RATE_LIMIT=500`).

use anyhow::{Context, Result};
use market_clock::MarketClockConfig;
use ppr_scoring::ScoringRules;
use serde::{Deserialize, Serialize};
use sleeper_client::{SleeperConfig, WeekResolver, WeekStrategy};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "FANTASY_MARKET";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upstream client configuration
    pub sleeper: SleeperConfig,

    /// Market hours and lock rules
    pub market: MarketClockConfig,

    /// Scoring rules
    pub scoring: ScoringSettings,

    /// Week resolution
    pub week: WeekSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Named scoring rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringPreset {
    #[default]
    FullPpr,
    HalfPpr,
    Standard,
}

/// Which scoring rules to apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Base rule set
    pub preset: ScoringPreset,

    /// League whose `scoring_settings` are overlaid on the preset
    pub league_id: Option<String>,
}

impl ScoringSettings {
    /// Rules for the configured preset, before any league overlay
    pub fn base_rules(&self) -> ScoringRules {
        match self.preset {
            ScoringPreset::FullPpr => ScoringRules::full_ppr(),
            ScoringPreset::HalfPpr => ScoringRules::half_ppr(),
            ScoringPreset::Standard => ScoringRules::standard(),
        }
    }
}

/// Week resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekSettings {
    /// Season to query; derived from today's date when unset
    pub season: Option<i32>,

    /// How the current week is found
    pub strategy: WeekStrategy,

    /// Calendar anchor for week 1
    pub season_start_month: u32,
    pub season_start_day: u32,
}

impl Default for WeekSettings {
    fn default() -> Self {
        Self {
            season: None,
            strategy: WeekStrategy::default(),
            season_start_month: 9,
            season_start_day: 5,
        }
    }
}

impl WeekSettings {
    pub fn resolver(&self) -> WeekResolver {
        WeekResolver::new(self.strategy).with_season_anchor(self.season_start_month, self.season_start_day)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve a Prometheus scrape endpoint
    pub enabled: bool,

    /// Metrics export port
    pub port: u16,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: false, port: 9090 }
    }
}

/// Load configuration from an optional file and environment variables
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    load_config_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
}

fn load_config_with_env(path: Option<&Path>, env: config::Environment) -> Result<ServiceConfig> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(env.prefix_separator("__").separator("__"))
        .build()
        .context("Failed to read configuration sources")?;

    let config: ServiceConfig =
        settings.try_deserialize().context("Failed to deserialize configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    config.sleeper.validate().context("Invalid sleeper configuration")?;
    config.market.validate().context("Invalid market configuration")?;

    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.metrics.enabled && config.metrics.port == 0 {
        return Err(anyhow::anyhow!("Invalid metrics port: {}", config.metrics.port));
    }

    if chrono::NaiveDate::from_ymd_opt(2024, config.week.season_start_month, config.week.season_start_day)
        .is_none()
    {
        return Err(anyhow::anyhow!(
            "Invalid season anchor: month {} day {}",
            config.week.season_start_month,
            config.week.season_start_day
        ));
    }

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write configuration to {:?}", path))?;
    Ok(())
}
