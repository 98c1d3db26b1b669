//! Weekly point lines and simple season-average projections

use serde::{Deserialize, Serialize};

/// One week of a player's fantasy output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLine {
    pub week: u32,
    pub actual: f64,
    pub projected: Option<f64>,
}

impl WeeklyLine {
    pub fn new(week: u32, actual: f64, projected: Option<f64>) -> Self {
        Self { week, actual, projected }
    }

    /// Actual minus projected points, zero when there was no projection
    pub fn diff(&self) -> f64 {
        self.projected.map(|projected| self.actual - projected).unwrap_or(0.0)
    }
}

/// Mean of actual points across the given weeks
pub fn season_average(lines: &[WeeklyLine]) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    lines.iter().map(|line| line.actual).sum::<f64>() / lines.len() as f64
}

/// Next week's projection: the season average so far
pub fn project_next_week(lines: &[WeeklyLine]) -> f64 {
    season_average(lines)
}

/// Projection for an arbitrary future week.
///
/// No opponent, injury or weather adjustment is applied yet, so every future
/// week projects to the current average.
pub fn project_week(_week: u32, current_average: f64) -> f64 {
    current_average
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_against_projection() {
        assert_eq!(WeeklyLine::new(1, 21.5, Some(18.0)).diff(), 3.5);
        assert_eq!(WeeklyLine::new(2, 9.0, Some(14.0)).diff(), -5.0);
        assert_eq!(WeeklyLine::new(3, 12.0, None).diff(), 0.0);
    }

    #[test]
    fn test_season_average() {
        let lines = vec![
            WeeklyLine::new(1, 20.0, None),
            WeeklyLine::new(2, 10.0, Some(15.0)),
            WeeklyLine::new(3, 15.0, None),
        ];
        assert_eq!(season_average(&lines), 15.0);
        assert_eq!(project_next_week(&lines), 15.0);
        assert_eq!(project_week(9, 15.0), 15.0);
    }

    #[test]
    fn test_empty_season_projects_zero() {
        assert_eq!(season_average(&[]), 0.0);
        assert_eq!(project_next_week(&[]), 0.0);
    }
}
