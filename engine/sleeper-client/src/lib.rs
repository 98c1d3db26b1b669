//! Sleeper API Client
//!
//! Read-only access to the Sleeper fantasy football API with a per-instance
//! rate window (1000 calls/minute by default) and a TTL response cache. Rate
//! limiting is backpressure: a caller that hits the limit waits for the window
//! to roll over instead of being rejected.
//!
//! Also home to the week resolver, which derives the current NFL week from the
//! schedule endpoints or from the calendar.

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod rate_window;
pub mod transport;
pub mod week;

pub use cache::{CacheStats, ResponseCache};
pub use client::{ClientStats, SleeperClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SleeperConfig;
pub use error::{Result, UpstreamError};
pub use rate_window::RateWindow;
pub use transport::{HttpTransport, Transport, TransportFailure};
pub use week::{season_for, ResolvedWeek, WeekResolver, WeekSource, WeekStrategy, MAX_WEEK};

/// Default Sleeper API base URL
pub const SLEEPER_API_BASE: &str = "https://api.sleeper.app/v1";
