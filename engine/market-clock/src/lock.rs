//! Per-player trading locks

use crate::config::MarketClockConfig;
use crate::error::Result;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Snapshot of the player attributes a lock decision needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLockInputs {
    pub player_id: String,
    pub current_week: u32,
    #[serde(default)]
    pub bye_week: Option<u32>,
    #[serde(default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub game_start_time: Option<NaiveDateTime>,
}

impl PlayerLockInputs {
    pub fn new(player_id: impl Into<String>, current_week: u32) -> Self {
        Self {
            player_id: player_id.into(),
            current_week,
            bye_week: None,
            injury_status: None,
            game_start_time: None,
        }
    }

    pub fn with_bye_week(mut self, bye_week: u32) -> Self {
        self.bye_week = Some(bye_week);
        self
    }

    pub fn with_injury_status(mut self, status: impl Into<String>) -> Self {
        self.injury_status = Some(status.into());
        self
    }

    pub fn with_game_start(mut self, start: NaiveDateTime) -> Self {
        self.game_start_time = Some(start);
        self
    }
}

/// Which rule locked a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    ByeWeek,
    Injury(String),
    ThursdayCutoff,
    GameStarted,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockReason::ByeWeek => write!(f, "bye week"),
            LockReason::Injury(status) => write!(f, "injury ({})", status),
            LockReason::ThursdayCutoff => write!(f, "Thursday night cutoff"),
            LockReason::GameStarted => write!(f, "game started"),
        }
    }
}

/// Decides whether a player may be traded at a given moment.
///
/// Stateless: every decision is made from the inputs passed in.
#[derive(Debug, Clone)]
pub struct LockEngine {
    injury_statuses: HashSet<String>,
    thursday_cutoff: NaiveTime,
    kickoff_buffer: Duration,
}

impl Default for LockEngine {
    fn default() -> Self {
        Self::new(
            ["O", "OUT", "IR", "IR-R"],
            NaiveTime::from_hms_opt(20, 20, 0).unwrap_or(NaiveTime::MIN),
            Duration::seconds(crate::DEFAULT_KICKOFF_BUFFER_SECS),
        )
    }
}

impl LockEngine {
    pub fn new<I, S>(injury_statuses: I, thursday_cutoff: NaiveTime, kickoff_buffer: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            injury_statuses: injury_statuses
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .collect(),
            thursday_cutoff,
            kickoff_buffer,
        }
    }

    pub fn from_config(config: &MarketClockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            &config.lock_injury_statuses,
            config.thursday_cutoff()?,
            config.kickoff_buffer(),
        ))
    }

    /// The first lock rule that applies, checked in priority order:
    /// bye week, injury, Thursday-night cutoff, game started.
    pub fn evaluate(&self, inputs: &PlayerLockInputs, now: NaiveDateTime) -> Option<LockReason> {
        let reason = self.first_reason(inputs, now);
        if let Some(reason) = &reason {
            debug!("Player {} locked: {}", inputs.player_id, reason);
        }
        reason
    }

    pub fn is_locked(&self, inputs: &PlayerLockInputs, now: NaiveDateTime) -> bool {
        self.evaluate(inputs, now).is_some()
    }

    fn first_reason(&self, inputs: &PlayerLockInputs, now: NaiveDateTime) -> Option<LockReason> {
        // Week 0 is "unknown", never a bye
        if matches!(inputs.bye_week, Some(bye) if bye != 0 && bye == inputs.current_week) {
            return Some(LockReason::ByeWeek);
        }

        if let Some(status) = &inputs.injury_status {
            let status = status.trim().to_uppercase();
            if self.injury_statuses.contains(&status) {
                return Some(LockReason::Injury(status));
            }
        }

        if let Some(kickoff) = inputs.game_start_time {
            if now.weekday() == Weekday::Thu
                && now.time() >= self.thursday_cutoff
                && kickoff.weekday() == Weekday::Thu
            {
                return Some(LockReason::ThursdayCutoff);
            }

            if now >= kickoff {
                return Some(LockReason::GameStarted);
            }
        }

        None
    }

    /// Game has started or kicks off within the buffer. Not part of the
    /// priority chain; callers compose it where they need it.
    pub fn should_lock_for_game(&self, game_start: NaiveDateTime, now: NaiveDateTime) -> bool {
        now >= game_start || game_start - now < self.kickoff_buffer
    }
}
