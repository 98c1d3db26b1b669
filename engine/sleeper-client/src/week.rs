//! Current NFL week resolution

use crate::client::SleeperClient;
use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Last week of the regular season
pub const MAX_WEEK: u32 = 18;

/// How the current week is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekStrategy {
    /// Probe the schedule endpoints
    Schedule,
    /// Count weeks from the season anchor date
    Calendar,
    /// Schedule probe, falling back to the calendar when it fails or finds nothing
    #[default]
    ScheduleThenCalendar,
}

/// Where a resolved week came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekSource {
    Schedule,
    Calendar,
    /// Given by the caller, no resolution performed
    Supplied,
}

/// A week number in [0, 18] plus its provenance. Week 0 means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWeek {
    pub week: u32,
    pub source: WeekSource,
}

impl ResolvedWeek {
    pub fn supplied(week: u32) -> Self {
        Self { week: week.min(MAX_WEEK), source: WeekSource::Supplied }
    }
}

#[derive(Debug, Clone)]
pub struct WeekResolver {
    strategy: WeekStrategy,
    season_start_month: u32,
    season_start_day: u32,
}

impl Default for WeekResolver {
    fn default() -> Self {
        Self::new(WeekStrategy::default())
    }
}

impl WeekResolver {
    /// Resolver anchored on September 5th
    pub fn new(strategy: WeekStrategy) -> Self {
        Self { strategy, season_start_month: 9, season_start_day: 5 }
    }

    /// Override the calendar anchor (month, day) of week 1
    pub fn with_season_anchor(mut self, month: u32, day: u32) -> Self {
        self.season_start_month = month;
        self.season_start_day = day;
        self
    }

    pub fn strategy(&self) -> WeekStrategy {
        self.strategy
    }

    /// Week number from the date alone: 0 before the anchor, then one week per
    /// seven days, capped at the last regular-season week.
    pub fn calendar_week(&self, season: i32, today: NaiveDate) -> u32 {
        let Some(anchor) =
            NaiveDate::from_ymd_opt(season, self.season_start_month, self.season_start_day)
        else {
            warn!(
                "Invalid season anchor {}-{:02}-{:02}",
                season, self.season_start_month, self.season_start_day
            );
            return 0;
        };

        if today < anchor {
            return 0;
        }

        let days = (today - anchor).num_days();
        ((days / 7 + 1) as u32).min(MAX_WEEK)
    }

    /// Latest week whose schedule payload has games, probing from the last
    /// week down. `None` when no week has data.
    pub async fn schedule_week(&self, client: &SleeperClient, season: i32) -> Result<Option<u32>> {
        for week in (1..=MAX_WEEK).rev() {
            let schedule = client.get_schedule(season, week).await?;
            if has_games(&schedule) {
                debug!("Schedule data found for {} week {}", season, week);
                return Ok(Some(week));
            }
        }

        Ok(None)
    }

    /// Resolve the current week with the configured strategy
    pub async fn resolve(
        &self,
        client: &SleeperClient,
        season: i32,
        today: NaiveDate,
    ) -> Result<ResolvedWeek> {
        let resolved = match self.strategy {
            WeekStrategy::Calendar => ResolvedWeek {
                week: self.calendar_week(season, today),
                source: WeekSource::Calendar,
            },
            WeekStrategy::Schedule => ResolvedWeek {
                week: self.schedule_week(client, season).await?.unwrap_or(0),
                source: WeekSource::Schedule,
            },
            WeekStrategy::ScheduleThenCalendar => match self.schedule_week(client, season).await {
                Ok(Some(week)) => ResolvedWeek { week, source: WeekSource::Schedule },
                Ok(None) => {
                    warn!("No schedule data for {}, falling back to calendar week", season);
                    self.calendar_fallback(season, today)
                }
                Err(e) => {
                    warn!("Schedule lookup failed ({}), falling back to calendar week", e);
                    self.calendar_fallback(season, today)
                }
            },
        };

        info!("Current week for {}: {} ({:?})", season, resolved.week, resolved.source);
        Ok(resolved)
    }

    fn calendar_fallback(&self, season: i32, today: NaiveDate) -> ResolvedWeek {
        ResolvedWeek { week: self.calendar_week(season, today), source: WeekSource::Calendar }
    }
}

/// NFL season a date belongs to
pub fn season_for(today: NaiveDate) -> i32 {
    // January and February games belong to the previous season
    if today.month() < 3 {
        today.year() - 1
    } else {
        today.year()
    }
}

fn has_games(schedule: &Value) -> bool {
    match schedule {
        Value::Array(games) => !games.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}
