//! Configuration for the market clock and lock engine

use crate::error::{MarketConfigError, Result};
use crate::{
    DEFAULT_CLOSE_TIME, DEFAULT_KICKOFF_BUFFER_SECS, DEFAULT_THURSDAY_CUTOFF, MAX_KICKOFF_BUFFER_SECS,
};
use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Market hours and lock rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketClockConfig {
    /// Day the market closes, e.g. "Sun"
    pub close_weekday: String,

    /// Close time on that day, "HH:MM"
    pub close_time: String,

    /// Thursday-night lock cutoff, "HH:MM"
    pub thursday_cutoff: String,

    /// Players lock this many seconds before kickoff
    pub kickoff_buffer_secs: i64,

    /// Injury designations that lock a player (case-insensitive)
    pub lock_injury_statuses: Vec<String>,

    /// How UTC instants map onto market wall-clock time
    pub time_reference: TimeReference,
}

/// Reference frame for the market's wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TimeReference {
    /// Local time of the host machine
    #[default]
    NaiveLocal,
    /// Fixed offset from UTC, e.g. -300 for US Eastern standard time
    UtcOffset { minutes: i32 },
}

impl TimeReference {
    /// Wall-clock time in this reference for a UTC instant
    pub fn to_reference(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            TimeReference::NaiveLocal => instant.with_timezone(&Local).naive_local(),
            TimeReference::UtcOffset { minutes } => {
                instant.naive_utc() + Duration::minutes(*minutes as i64)
            }
        }
    }
}

impl Default for MarketClockConfig {
    fn default() -> Self {
        Self {
            close_weekday: "Sun".to_string(),
            close_time: DEFAULT_CLOSE_TIME.to_string(),
            thursday_cutoff: DEFAULT_THURSDAY_CUTOFF.to_string(),
            kickoff_buffer_secs: DEFAULT_KICKOFF_BUFFER_SECS,
            lock_injury_statuses: ["O", "OUT", "IR", "IR-R"].iter().map(|s| s.to_string()).collect(),
            time_reference: TimeReference::NaiveLocal,
        }
    }
}

impl MarketClockConfig {
    /// Parsed close weekday
    pub fn close_weekday(&self) -> Result<Weekday> {
        self.close_weekday
            .trim()
            .parse::<Weekday>()
            .map_err(|_| MarketConfigError::invalid("close_weekday", format!("{:?}", self.close_weekday)))
    }

    /// Parsed close time
    pub fn close_time(&self) -> Result<NaiveTime> {
        parse_hhmm("close_time", &self.close_time)
    }

    /// Parsed Thursday cutoff
    pub fn thursday_cutoff(&self) -> Result<NaiveTime> {
        parse_hhmm("thursday_cutoff", &self.thursday_cutoff)
    }

    /// Pre-kickoff buffer, clamped to the accepted range
    pub fn kickoff_buffer(&self) -> Duration {
        Duration::seconds(self.kickoff_buffer_secs.clamp(0, MAX_KICKOFF_BUFFER_SECS))
    }

    /// Check every field parses and is in range
    pub fn validate(&self) -> Result<()> {
        self.close_weekday()?;
        self.close_time()?;
        self.thursday_cutoff()?;

        if self.kickoff_buffer_secs < 0 {
            return Err(MarketConfigError::invalid(
                "kickoff_buffer_secs",
                format!("must not be negative, got {}", self.kickoff_buffer_secs),
            ));
        }

        if self.kickoff_buffer_secs > MAX_KICKOFF_BUFFER_SECS {
            return Err(MarketConfigError::invalid(
                "kickoff_buffer_secs",
                format!("must be at most {}, got {}", MAX_KICKOFF_BUFFER_SECS, self.kickoff_buffer_secs),
            ));
        }

        if let TimeReference::UtcOffset { minutes } = self.time_reference {
            if minutes.unsigned_abs() >= 24 * 60 {
                return Err(MarketConfigError::invalid(
                    "time_reference",
                    format!("offset of {} minutes is more than a day", minutes),
                ));
            }
        }

        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MarketClockConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn parse_hhmm(field: &'static str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| MarketConfigError::invalid(field, format!("{:?} is not HH:MM ({})", value, e)))
}
