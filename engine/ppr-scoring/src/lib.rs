//! PPR Scoring Engine
//!
//! Converts raw per-player stat counters from the Sleeper API into fantasy points.
//! Scoring is a pure function of the stat record: no clock, no cache, no I/O.
//! Arithmetic runs on exact decimals and the total is rounded to two places.

pub mod calculator;
pub mod config;
pub mod error;
pub mod projection;
pub mod stats;

pub use calculator::{BatchScore, FantasyPoints, PprCalculator};
pub use config::ScoringRules;
pub use error::{Result, ScoringError};
pub use projection::{project_next_week, project_week, season_average, WeeklyLine};
pub use stats::{StatField, StatRecord};

/// Number of decimal places kept in a score
pub const SCORE_DECIMAL_PLACES: u32 = 2;
