//! Error types for PPR scoring

use thiserror::Error;

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors that can occur while scoring a stat record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Stat input must be a mapping of stat name to value, got {found}")]
    InputShape { found: String },

    #[error("Invalid value for stat {stat}: {value}")]
    InvalidStatValue { stat: String, value: String },

    #[error("Points for stat {stat} overflow the decimal range")]
    Overflow { stat: String },
}
