//! # Market Clock
//!
//! Decides when the fantasy market trades and which players are locked out of
//! trading at a given moment.
//!
//! Everything here is a pure function of its inputs. Callers pass "now" in as a
//! [`chrono::NaiveDateTime`] in the market's reference time; [`TimeReference`]
//! converts a UTC instant into that reference.

pub mod config;
pub mod error;
pub mod hours;
pub mod lock;


pub use config::{MarketClockConfig, TimeReference};
pub use error::{MarketConfigError, Result};
pub use hours::MarketClock;
pub use lock::{LockEngine, LockReason, PlayerLockInputs};

/// Default close time ("HH:MM")
pub const DEFAULT_CLOSE_TIME: &str = "13:00";

/// Default Thursday-night lock cutoff ("HH:MM")
pub const DEFAULT_THURSDAY_CUTOFF: &str = "20:20";

/// Default pre-kickoff lock buffer
pub const DEFAULT_KICKOFF_BUFFER_SECS: i64 = 300;

/// Longest accepted pre-kickoff lock buffer (one week)
pub const MAX_KICKOFF_BUFFER_SECS: i64 = 7 * 24 * 60 * 60;
