use crate::cache::{CacheStats, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::config::SleeperConfig;
use crate::error::{Result, UpstreamError};
use crate::rate_window::RateWindow;
use crate::transport::{HttpTransport, Transport, TransportFailure};
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Rate window and cache, always touched together under one lock
struct ClientState {
    window: RateWindow,
    cache: ResponseCache,
}

/// Client for fetching data from the Sleeper API
///
/// One instance owns one rate window and one cache. Share it by reference (or
/// `Arc`) between callers; every fetch runs its window check, cache check,
/// rate-limit wait, request and bookkeeping as a single critical section, so
/// concurrent callers can never jointly overrun the limit.
pub struct SleeperClient {
    config: SleeperConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    state: Mutex<ClientState>,
}

/// Point-in-time view of the client's accounting
#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub calls_this_window: u32,
    pub rate_limit: u32,
    pub window_secs: u64,
    pub cache: CacheStats,
}

impl SleeperClient {
    /// Create a client that talks to the real API on real time
    pub fn new(config: SleeperConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Self::with_parts(config, Arc::new(transport), Arc::new(SystemClock))
    }

    /// Create a client from explicit transport and clock
    pub fn with_parts(
        config: SleeperConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let now = clock.now();
        let state = ClientState {
            window: RateWindow::new(config.rate_limit, config.window(), now),
            cache: ResponseCache::new(config.cache_ttl()),
        };

        info!(
            "Created Sleeper client for {} (limit {} calls/{}s, cache TTL {}s)",
            config.base_url, config.rate_limit, config.window_secs, config.cache_ttl_secs
        );

        Ok(Self { config, transport, clock, state: Mutex::new(state) })
    }

    /// Fetch an endpoint (path relative to the base URL).
    ///
    /// Served from cache when a fresh entry exists. Otherwise waits out the
    /// rate window if it is exhausted, then calls upstream. Only successful
    /// calls are cached and counted.
    pub async fn fetch(&self, endpoint: &str) -> Result<Arc<Value>> {
        let mut state = self.state.lock().await;

        let now = self.clock.now();
        if state.window.roll(now) {
            debug!("Rate window rolled over");
        }

        if let Some(payload) = state.cache.get_fresh(endpoint, now) {
            debug!("Cache hit for {}", endpoint);
            counter!("sleeper_client.cache_hits", 1);
            return Ok(payload);
        }

        if state.window.is_exhausted() {
            let wait = state.window.remaining(now);
            warn!(
                "Rate limit of {} calls reached. Waiting {:.2} seconds",
                state.window.limit(),
                wait.num_milliseconds() as f64 / 1000.0
            );
            counter!("sleeper_client.rate_limit_waits", 1);

            self.clock.sleep(wait.to_std().unwrap_or_default()).await;
            state.window.reset(self.clock.now());
        }

        let payload = match self.request(endpoint).await {
            Ok(payload) => Arc::new(payload),
            Err(e) => {
                error!("Error fetching {}: {}", endpoint, e);
                counter!("sleeper_client.upstream_errors", 1);
                return Err(e);
            }
        };

        let fetched_at = self.clock.now();
        state.cache.insert(endpoint, Arc::clone(&payload), fetched_at);
        state.window.record_call();
        counter!("sleeper_client.upstream_requests", 1);

        debug!("API call to {} - Calls this window: {}", endpoint, state.window.calls());
        Ok(payload)
    }

    async fn request(&self, endpoint: &str) -> Result<Value> {
        let url = self.url_for(endpoint);
        let deadline = self.config.request_timeout();

        let timed_out = || UpstreamError::Timeout {
            endpoint: endpoint.to_string(),
            timeout_secs: self.config.request_timeout_secs,
        };

        match tokio::time::timeout(deadline, self.transport.get_json(&url)).await {
            Err(_) | Ok(Err(TransportFailure::Timeout)) => Err(timed_out()),
            Ok(Err(TransportFailure::Failed(reason))) => {
                Err(UpstreamError::Unavailable { endpoint: endpoint.to_string(), reason })
            }
            Ok(Ok(payload)) => Ok(payload),
        }
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// All NFL players, keyed by player_id
    pub async fn get_all_players(&self) -> Result<Arc<Value>> {
        self.fetch("players/nfl").await
    }

    /// All player stats for one week, keyed by player_id
    pub async fn get_player_stats(&self, season: i32, week: u32) -> Result<Arc<Value>> {
        self.fetch(&format!("stats/nfl/{}/{}", season, week)).await
    }

    /// Game schedule for one week
    pub async fn get_schedule(&self, season: i32, week: u32) -> Result<Arc<Value>> {
        self.fetch(&format!("schedule/nfl/{}/{}", season, week)).await
    }

    /// League information including scoring settings
    pub async fn get_league_info(&self, league_id: &str) -> Result<Arc<Value>> {
        self.fetch(&format!("league/{}", league_id)).await
    }

    /// Player projections for one week
    pub async fn get_projections(&self, season: i32, week: u32) -> Result<Arc<Value>> {
        self.fetch(&format!("projections/nfl/{}/{}", season, week)).await
    }

    /// Drop every cached response
    pub async fn clear_cache(&self) -> usize {
        self.state.lock().await.cache.clear()
    }

    /// Current window usage and cache contents
    pub async fn stats(&self) -> ClientStats {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.window.roll(now);

        ClientStats {
            calls_this_window: state.window.calls(),
            rate_limit: self.config.rate_limit,
            window_secs: self.config.window_secs,
            cache: state.cache.stats(now),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;
    use std::collections::HashMap;

    /// Transport that serves canned responses and records every URL it was asked for
    #[derive(Default)]
    pub(crate) struct MockTransport {
        responses: SyncMutex<HashMap<String, std::result::Result<Value, TransportFailure>>>,
        requests: SyncMutex<Vec<String>>,
    }

    impl MockTransport {
        pub(crate) fn respond(&self, url: &str, body: Value) {
            self.responses.lock().insert(url.to_string(), Ok(body));
        }

        pub(crate) fn fail(&self, url: &str, failure: TransportFailure) {
            self.responses.lock().insert(url.to_string(), Err(failure));
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().len()
        }

        pub(crate) fn calls_to(&self, url: &str) -> usize {
            self.requests.lock().iter().filter(|u| u.as_str() == url).count()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get_json(&self, url: &str) -> std::result::Result<Value, TransportFailure> {
            self.requests.lock().push(url.to_string());
            self.responses
                .lock()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(TransportFailure::Failed("HTTP 404 Not Found".to_string())))
        }
    }

    /// Transport that never answers in time
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn get_json(&self, _url: &str) -> std::result::Result<Value, TransportFailure> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(json!({}))
        }
    }

    pub(crate) const BASE: &str = "http://sleeper.test/v1";

    pub(crate) fn test_config() -> SleeperConfig {
        SleeperConfig { base_url: BASE.to_string(), ..SleeperConfig::default() }
    }

    pub(crate) fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 6, 12, 0, 0).unwrap()
    }

    fn build(
        config: SleeperConfig,
    ) -> (SleeperClient, Arc<MockTransport>, Arc<ManualClock>) {
        let transport = Arc::new(MockTransport::default());
        let clock = Arc::new(ManualClock::new(kickoff()));
        let client = SleeperClient::with_parts(config, transport.clone(), clock.clone()).unwrap();
        (client, transport, clock)
    }

    #[tokio::test]
    async fn test_repeated_fetches_within_ttl_hit_network_once() {
        let (client, transport, clock) = build(test_config());
        transport.respond(&format!("{}/players/nfl", BASE), json!({ "4046": { "team": "KC" } }));

        for _ in 0..10 {
            let payload = client.get_all_players().await.unwrap();
            assert_eq!(payload["4046"]["team"], "KC");
            clock.advance(Duration::seconds(20));
        }
        assert_eq!(transport.calls(), 1);

        // 200s elapsed so far; push past the 300s TTL
        clock.advance(Duration::seconds(100));
        client.get_all_players().await.unwrap();
        assert_eq!(transport.calls(), 2);

        client.get_all_players().await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_hits_do_not_count_against_limit() {
        let (client, transport, _clock) = build(test_config());
        transport.respond(&format!("{}/league/42", BASE), json!({ "name": "Dynasty" }));

        for _ in 0..5 {
            client.get_league_info("42").await.unwrap();
        }

        let stats = client.stats().await;
        assert_eq!(stats.calls_this_window, 1);
        assert_eq!(stats.cache.entries, 1);
    }

    #[tokio::test]
    async fn test_exhausted_window_waits_instead_of_rejecting() {
        let config = SleeperConfig { rate_limit: 3, ..test_config() };
        let (client, transport, clock) = build(config);
        for week in 1..=4 {
            transport.respond(&format!("{}/stats/nfl/2024/{}", BASE, week), json!({ "week": week }));
        }

        for week in 1..=3 {
            client.get_player_stats(2024, week).await.unwrap();
            clock.advance(Duration::seconds(5));
        }
        assert_eq!(clock.total_slept(), Duration::zero());

        // Fourth distinct call in the same window blocks until rollover
        let payload = client.get_player_stats(2024, 4).await.unwrap();
        assert_eq!(payload["week"], 4);
        assert_eq!(transport.calls(), 4);
        assert_eq!(clock.total_slept(), Duration::seconds(45));
        assert_eq!(clock.now(), kickoff() + Duration::seconds(60));

        let stats = client.stats().await;
        assert_eq!(stats.calls_this_window, 1);
    }

    #[tokio::test]
    async fn test_window_rollover_resets_budget_without_waiting() {
        let config = SleeperConfig { rate_limit: 2, ..test_config() };
        let (client, transport, clock) = build(config);
        for week in 1..=3 {
            transport.respond(&format!("{}/schedule/nfl/2024/{}", BASE, week), json!([]));
        }

        client.get_schedule(2024, 1).await.unwrap();
        client.get_schedule(2024, 2).await.unwrap();
        clock.advance(Duration::seconds(61));
        client.get_schedule(2024, 3).await.unwrap();

        assert_eq!(clock.total_slept(), Duration::zero());
        assert_eq!(client.stats().await.calls_this_window, 1);
    }

    #[tokio::test]
    async fn test_cached_endpoint_served_while_window_exhausted() {
        let config = SleeperConfig { rate_limit: 1, ..test_config() };
        let (client, transport, clock) = build(config);
        transport.respond(&format!("{}/players/nfl", BASE), json!({}));

        client.get_all_players().await.unwrap();
        client.get_all_players().await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(clock.total_slept(), Duration::zero());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached_or_counted() {
        let (client, transport, _clock) = build(test_config());
        let url = format!("{}/projections/nfl/2024/3", BASE);
        transport.fail(&url, TransportFailure::Failed("HTTP 500 Internal Server Error".to_string()));

        let err = client.get_projections(2024, 3).await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Unavailable {
                endpoint: "projections/nfl/2024/3".to_string(),
                reason: "HTTP 500 Internal Server Error".to_string(),
            }
        );

        let stats = client.stats().await;
        assert_eq!(stats.calls_this_window, 0);
        assert_eq!(stats.cache.entries, 0);

        // Next call goes upstream again and succeeds once the provider recovers
        transport.respond(&url, json!({ "4046": { "pts_ppr": 21.3 } }));
        client.get_projections(2024, 3).await.unwrap();
        assert_eq!(transport.calls_to(&url), 2);
        assert_eq!(client.stats().await.calls_this_window, 1);
    }

    #[tokio::test]
    async fn test_transport_timeout_maps_to_timeout_error() {
        let (client, transport, _clock) = build(test_config());
        transport.fail(&format!("{}/players/nfl", BASE), TransportFailure::Timeout);

        let err = client.get_all_players().await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Timeout { endpoint: "players/nfl".to_string(), timeout_secs: 10 }
        );
        assert!(err.is_transport());
        assert_eq!(err.endpoint(), Some("players/nfl"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_applies_to_slow_transport() {
        let clock = Arc::new(ManualClock::new(kickoff()));
        let client =
            SleeperClient::with_parts(test_config(), Arc::new(HangingTransport), clock).unwrap();

        let err = client.get_all_players().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout { timeout_secs: 10, .. }));
        assert_eq!(client.stats().await.cache.entries, 0);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let (client, transport, _clock) = build(test_config());
        transport.respond(&format!("{}/players/nfl", BASE), json!({}));

        client.get_all_players().await.unwrap();
        assert_eq!(client.clear_cache().await, 1);
        client.get_all_players().await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_budget() {
        let config = SleeperConfig { rate_limit: 5, ..test_config() };
        let (client, transport, clock) = build(config);
        for week in 1..=10 {
            transport.respond(&format!("{}/stats/nfl/2024/{}", BASE, week), json!({}));
        }
        let client = Arc::new(client);

        let handles: Vec<_> = (1..=10)
            .map(|week| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.get_player_stats(2024, week).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(transport.calls(), 10);
        // Exactly one rollover wait for the second batch of five
        assert_eq!(clock.total_slept(), Duration::seconds(60));
        assert_eq!(client.stats().await.calls_this_window, 5);
    }

    #[test]
    fn test_url_joining() {
        let config = SleeperConfig { base_url: format!("{}/", BASE), ..SleeperConfig::default() };
        let client = SleeperClient::with_parts(
            config,
            Arc::new(MockTransport::default()),
            Arc::new(ManualClock::new(kickoff())),
        )
        .unwrap();
        assert_eq!(client.url_for("/players/nfl"), "http://sleeper.test/v1/players/nfl");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SleeperConfig { rate_limit: 0, ..test_config() };
        let result = SleeperClient::with_parts(
            config,
            Arc::new(MockTransport::default()),
            Arc::new(ManualClock::new(kickoff())),
        );
        assert!(matches!(result, Err(UpstreamError::Config(_))));

        let config = SleeperConfig { window_secs: u64::MAX, ..test_config() };
        let result = SleeperClient::with_parts(
            config,
            Arc::new(MockTransport::default()),
            Arc::new(ManualClock::new(kickoff())),
        );
        assert!(matches!(result, Err(UpstreamError::Config(_))));
    }
}
