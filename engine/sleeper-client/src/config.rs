use crate::error::{Result, UpstreamError};
use crate::SLEEPER_API_BASE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted rate window (one day)
pub const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Longest accepted cache TTL (one week)
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted request deadline (one hour)
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 60 * 60;

/// Configuration for the Sleeper API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleeperConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Maximum upstream calls per rate window
    pub rate_limit: u32,

    /// Rate window length in seconds
    pub window_secs: u64,

    /// How long a cached response stays valid, in seconds
    pub cache_ttl_secs: u64,

    /// Deadline for a single upstream request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for SleeperConfig {
    fn default() -> Self {
        Self {
            base_url: SLEEPER_API_BASE.to_string(),
            rate_limit: 1000,
            window_secs: 60,
            cache_ttl_secs: 300,
            request_timeout_secs: 10,
        }
    }
}

impl SleeperConfig {
    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(UpstreamError::Config("base_url must not be empty".to_string()));
        }
        if self.rate_limit == 0 {
            return Err(UpstreamError::Config("rate_limit must be at least 1".to_string()));
        }
        check_range("window_secs", self.window_secs, 1, MAX_WINDOW_SECS)?;
        check_range("cache_ttl_secs", self.cache_ttl_secs, 0, MAX_CACHE_TTL_SECS)?;
        check_range("request_timeout_secs", self.request_timeout_secs, 1, MAX_REQUEST_TIMEOUT_SECS)?;
        Ok(())
    }

    /// Rate window length
    pub fn window(&self) -> chrono::Duration {
        seconds(self.window_secs.min(MAX_WINDOW_SECS))
    }

    /// Cache time-to-live
    pub fn cache_ttl(&self) -> chrono::Duration {
        seconds(self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS))
    }

    /// Per-request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn check_range(field: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(UpstreamError::Config(format!("{} must be between {} and {}, got {}", field, min, max, value)))
    }
}

fn seconds(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}
