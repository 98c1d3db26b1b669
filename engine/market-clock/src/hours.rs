//! Weekly market hours

use crate::config::MarketClockConfig;
use crate::error::Result;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use tracing::debug;

/// Open/closed state of the market over a weekly cycle.
///
/// The market is open all week except on the close weekday from the close
/// time until midnight. With the defaults that means it closes at Sunday
/// 13:00 and reopens Monday 00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketClock {
    close_weekday: Weekday,
    close_time: NaiveTime,
}

impl Default for MarketClock {
    fn default() -> Self {
        Self {
            close_weekday: Weekday::Sun,
            close_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl MarketClock {
    pub fn new(close_weekday: Weekday, close_time: NaiveTime) -> Self {
        Self { close_weekday, close_time }
    }

    pub fn from_config(config: &MarketClockConfig) -> Result<Self> {
        Ok(Self::new(config.close_weekday()?, config.close_time()?))
    }

    pub fn close_weekday(&self) -> Weekday {
        self.close_weekday
    }

    pub fn close_time(&self) -> NaiveTime {
        self.close_time
    }

    /// Whether trading is allowed at `now`
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        !(now.weekday() == self.close_weekday && now.time() >= self.close_time)
    }

    /// The close the market is heading towards, or `None` while closed
    pub fn next_close(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.is_open(now) {
            return None;
        }

        let today = now.weekday().num_days_from_monday() as i64;
        let target = self.close_weekday.num_days_from_monday() as i64;
        let days_ahead = (target - today).rem_euclid(7);

        let close_date = now.date() + Duration::days(days_ahead);
        Some(close_date.and_time(self.close_time))
    }

    /// Time left until close, populated only while open
    pub fn time_until_close(&self, now: NaiveDateTime) -> Option<Duration> {
        let remaining = self.next_close(now).map(|close| close - now);
        if let Some(remaining) = remaining {
            debug!("Market closes in {}s", remaining.num_seconds());
        }
        remaining
    }
}
