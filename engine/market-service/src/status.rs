//! Market status snapshots
//!
//! Combines the current week, the market hours and the per-player lock rules
//! into one [`MarketStatus`]. Snapshots are rebuilt on every request.

use chrono::{Duration, NaiveDateTime};
use market_clock::{LockEngine, LockReason, MarketClock, PlayerLockInputs};
use metrics::counter;
use serde::{Deserialize, Serialize, Serializer};
use sleeper_client::{ResolvedWeek, SleeperClient, UpstreamError, WeekResolver, WeekSource};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// A player whose lock state the caller wants reported.
///
/// Same shape as [`PlayerLockInputs`] minus the week, which comes from the
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    pub player_id: String,
    #[serde(default)]
    pub bye_week: Option<u32>,
    #[serde(default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub game_start_time: Option<NaiveDateTime>,
}

impl TrackedPlayer {
    pub fn lock_inputs(&self, current_week: u32) -> PlayerLockInputs {
        PlayerLockInputs {
            player_id: self.player_id.clone(),
            current_week,
            bye_week: self.bye_week,
            injury_status: self.injury_status.clone(),
            game_start_time: self.game_start_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketStatus {
    pub current_week: u32,
    pub week_source: WeekSource,
    pub is_open: bool,
    pub locked_players: BTreeSet<String>,
    /// Why each locked player is locked
    pub lock_reasons: BTreeMap<String, LockReason>,
    /// Seconds until close, absent while closed
    #[serde(rename = "time_until_close_secs", serialize_with = "serialize_secs")]
    pub time_until_close: Option<Duration>,
}

fn serialize_secs<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => serializer.serialize_some(&duration.num_seconds()),
        None => serializer.serialize_none(),
    }
}

pub struct MarketStatusAssembler {
    resolver: WeekResolver,
    clock: MarketClock,
    locks: LockEngine,
}

impl MarketStatusAssembler {
    pub fn new(resolver: WeekResolver, clock: MarketClock, locks: LockEngine) -> Self {
        Self { resolver, clock, locks }
    }

    pub fn resolver(&self) -> &WeekResolver {
        &self.resolver
    }

    /// Build a snapshot at `now` (market reference time).
    ///
    /// With `supplied_week` the week is taken as given and upstream is not
    /// consulted. Otherwise the resolver runs, and its upstream errors
    /// propagate. `locked_players` only covers the players passed in.
    pub async fn snapshot(
        &self,
        client: &SleeperClient,
        season: i32,
        supplied_week: Option<u32>,
        now: NaiveDateTime,
        players: &[TrackedPlayer],
    ) -> Result<MarketStatus, UpstreamError> {
        let week = match supplied_week {
            Some(week) => ResolvedWeek::supplied(week),
            None => self.resolver.resolve(client, season, now.date()).await?,
        };

        Ok(self.assemble(week, now, players))
    }

    /// Snapshot from an already-resolved week
    pub fn assemble(&self, week: ResolvedWeek, now: NaiveDateTime, players: &[TrackedPlayer]) -> MarketStatus {
        let lock_reasons: BTreeMap<String, LockReason> = players
            .iter()
            .filter_map(|player| {
                let inputs = player.lock_inputs(week.week);
                self.locks.evaluate(&inputs, now).map(|reason| (player.player_id.clone(), reason))
            })
            .collect();

        let status = MarketStatus {
            current_week: week.week,
            week_source: week.source,
            is_open: self.clock.is_open(now),
            locked_players: lock_reasons.keys().cloned().collect(),
            lock_reasons,
            time_until_close: self.clock.time_until_close(now),
        };

        counter!("market_service.snapshots", 1);
        info!(
            "Market status: week {} ({:?}), open: {}, {} of {} players locked",
            status.current_week,
            status.week_source,
            status.is_open,
            status.locked_players.len(),
            players.len()
        );
        status
    }
}
