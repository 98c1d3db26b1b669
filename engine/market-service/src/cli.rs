//! # Command Line Interface
//!
//! Operator commands for querying market status, the current week and scores.
//! Every command prints JSON on stdout.

use crate::config::{save_config, ServiceConfig};
use crate::projections::{weekly_line, PlayerProjection};
use crate::status::{MarketStatusAssembler, TrackedPlayer};
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use market_clock::{LockEngine, MarketClock};
use ppr_scoring::{PprCalculator, ScoringRules};
use serde::Serialize;
use serde_json::{json, Value};
use sleeper_client::{season_for, SleeperClient};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fantasy market operator CLI
#[derive(Parser)]
#[command(name = "fantasy-market")]
#[command(about = "Fantasy market status, week resolution and PPR scoring")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show market status: week, open/closed, locked players
    Status {
        /// Season (defaults to configured or current season)
        #[arg(long)]
        season: Option<i32>,
        /// Use this week instead of resolving it
        #[arg(long)]
        week: Option<u32>,
        /// JSON file with the players to check for locks
        #[arg(long)]
        players: Option<PathBuf>,
        /// Evaluate at this market time (e.g. 2024-10-13T12:00:00)
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// Resolve the current week
    Week {
        #[arg(long)]
        season: Option<i32>,
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// Score one week of upstream stats
    Score {
        #[arg(long)]
        season: Option<i32>,
        #[arg(long)]
        week: u32,
        /// Only report these players
        #[arg(long = "player")]
        players: Vec<String>,
    },
    /// Score a local `player_id -> stats` JSON file
    ScoreFile {
        path: PathBuf,
    },
    /// Weekly lines, season average and next-week projection for one player
    Project {
        player_id: String,
        #[arg(long)]
        season: Option<i32>,
        /// Last completed week to include
        #[arg(long)]
        through_week: u32,
    },
    /// Write the effective configuration to a TOML file
    InitConfig {
        path: PathBuf,
    },
}

/// CLI handler
pub struct CliHandler {
    config: ServiceConfig,
    client: SleeperClient,
    assembler: MarketStatusAssembler,
}

impl CliHandler {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = SleeperClient::new(config.sleeper.clone()).context("Failed to create Sleeper client")?;
        let assembler = MarketStatusAssembler::new(
            config.week.resolver(),
            MarketClock::from_config(&config.market)?,
            LockEngine::from_config(&config.market)?,
        );

        Ok(Self { config, client, assembler })
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Status { season, week, players, at } => {
                self.show_status(season, week, players.as_deref(), at).await?;
            }
            Commands::Week { season, at } => {
                self.show_week(season, at).await?;
            }
            Commands::Score { season, week, players } => {
                self.show_scores(season, week, &players).await?;
            }
            Commands::ScoreFile { path } => {
                self.score_file(&path).await?;
            }
            Commands::Project { player_id, season, through_week } => {
                self.show_projection(&player_id, season, through_week).await?;
            }
            Commands::InitConfig { path } => {
                save_config(&self.config, &path)?;
                info!("Configuration written to {:?}", path);
            }
        }

        Ok(())
    }

    async fn show_status(
        &self,
        season: Option<i32>,
        week: Option<u32>,
        players: Option<&Path>,
        at: Option<NaiveDateTime>,
    ) -> Result<()> {
        let now = self.market_now(at);
        let season = self.season(season, now);
        let tracked = match players {
            Some(path) => load_tracked_players(path)?,
            None => Vec::new(),
        };

        let status = self
            .assembler
            .snapshot(&self.client, season, week, now, &tracked)
            .await
            .context("Failed to build market status")?;

        print_json(&status)
    }

    async fn show_week(&self, season: Option<i32>, at: Option<NaiveDateTime>) -> Result<()> {
        let now = self.market_now(at);
        let season = self.season(season, now);

        let resolved = self
            .assembler
            .resolver()
            .resolve(&self.client, season, now.date())
            .await
            .context("Failed to resolve current week")?;

        print_json(&json!({ "season": season, "week": resolved.week, "source": resolved.source }))
    }

    async fn show_scores(&self, season: Option<i32>, week: u32, players: &[String]) -> Result<()> {
        let season = self.season(season, self.market_now(None));
        let calculator = PprCalculator::new(self.scoring_rules().await?);

        let stats = self
            .client
            .get_player_stats(season, week)
            .await
            .with_context(|| format!("Failed to fetch stats for {} week {}", season, week))?;

        let stats = if players.is_empty() {
            (*stats).clone()
        } else {
            Value::Object(
                players
                    .iter()
                    .filter_map(|id| stats.get(id).map(|s| (id.clone(), s.clone())))
                    .collect(),
            )
        };

        let batch = calculator.score_batch(&stats)?;
        print_json(&batch)
    }

    async fn score_file(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stats file {:?}", path))?;
        let raw: Value = serde_json::from_str(&content)
            .with_context(|| format!("Stats file {:?} is not valid JSON", path))?;

        let calculator = PprCalculator::new(self.scoring_rules().await?);
        let batch = calculator.score_batch(&raw)?;
        if !batch.is_complete() {
            warn!("{} players in {:?} could not be scored", batch.failures.len(), path);
        }

        print_json(&batch)
    }

    async fn show_projection(&self, player_id: &str, season: Option<i32>, through_week: u32) -> Result<()> {
        let season = self.season(season, self.market_now(None));
        let calculator = PprCalculator::new(self.scoring_rules().await?);

        let mut lines = Vec::new();
        for week in 1..=through_week {
            let stats = self.client.get_player_stats(season, week).await?;
            let projections = self.client.get_projections(season, week).await?;

            if let Some(line) = weekly_line(&calculator, week, player_id, &stats, &projections)? {
                lines.push(line);
            }
        }

        print_json(&PlayerProjection::from_lines(player_id, lines))
    }

    /// Preset rules with the configured league's overrides applied
    async fn scoring_rules(&self) -> Result<ScoringRules> {
        let rules = self.config.scoring.base_rules();

        let Some(league_id) = &self.config.scoring.league_id else {
            return Ok(rules);
        };

        let league = self
            .client
            .get_league_info(league_id)
            .await
            .with_context(|| format!("Failed to fetch league {}", league_id))?;

        Ok(rules.with_league_settings(&league["scoring_settings"]))
    }

    fn market_now(&self, at: Option<NaiveDateTime>) -> NaiveDateTime {
        at.unwrap_or_else(|| self.config.market.time_reference.to_reference(Utc::now()))
    }

    fn season(&self, season: Option<i32>, now: NaiveDateTime) -> i32 {
        season.or(self.config.week.season).unwrap_or_else(|| season_for(now.date()))
    }
}

fn load_tracked_players(path: &Path) -> Result<Vec<TrackedPlayer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read players file {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid players file {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
