//! Per-player weekly lines built from upstream stats and projections

use ppr_scoring::{project_next_week, season_average, PprCalculator, ScoringError, WeeklyLine};
use serde::Serialize;
use serde_json::Value;

/// Projection key in the upstream projections payload
const PROJECTED_POINTS_KEY: &str = "pts_ppr";

/// A player's season so far and where it points next
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProjection {
    pub player_id: String,
    pub lines: Vec<WeeklyLine>,
    pub season_average: f64,
    pub next_week_projection: f64,
}

impl PlayerProjection {
    pub fn from_lines(player_id: impl Into<String>, lines: Vec<WeeklyLine>) -> Self {
        Self {
            player_id: player_id.into(),
            season_average: season_average(&lines),
            next_week_projection: project_next_week(&lines),
            lines,
        }
    }
}

/// One week's line for a player, or `None` when the stats payload has no
/// entry for them (bye, inactive, or not yet played).
///
/// `stats` and `projections` are the week's `player_id -> object` payloads.
pub fn weekly_line(
    calculator: &PprCalculator,
    week: u32,
    player_id: &str,
    stats: &Value,
    projections: &Value,
) -> Result<Option<WeeklyLine>, ScoringError> {
    let Some(player_stats) = stats.get(player_id) else {
        return Ok(None);
    };

    let actual = calculator.score_value(player_stats)?;
    let projected = projections
        .get(player_id)
        .and_then(|p| p.get(PROJECTED_POINTS_KEY))
        .and_then(Value::as_f64);

    Ok(Some(WeeklyLine::new(week, actual.as_f64(), projected)))
}
