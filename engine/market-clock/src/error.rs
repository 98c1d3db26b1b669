//! Error types for the market clock

use thiserror::Error;

/// Result type for market clock configuration
pub type Result<T> = std::result::Result<T, MarketConfigError>;

/// Invalid or unreadable market configuration
#[derive(Error, Debug)]
pub enum MarketConfigError {
    #[error("Failed to read market config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse market config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize market config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl MarketConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MarketConfigError::Invalid { field, reason: reason.into() }
    }
}
