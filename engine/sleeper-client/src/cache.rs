//! TTL cache of upstream responses, keyed by endpoint

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Arc<Value>,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).max(Duration::zero())
    }
}

/// Response cache with lazy expiry: stale entries stay in place until the
/// next successful fetch of the same endpoint overwrites them.
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: HashMap::new(), ttl }
    }

    /// Payload for `endpoint` if it was fetched less than one TTL ago
    pub fn get_fresh(&self, endpoint: &str, now: DateTime<Utc>) -> Option<Arc<Value>> {
        let entry = self.entries.get(endpoint)?;
        let age = entry.age(now);

        if age >= self.ttl {
            debug!("Cache entry for {} expired (age: {}s)", endpoint, age.num_seconds());
            return None;
        }

        Some(Arc::clone(&entry.payload))
    }

    /// Store a payload, replacing whatever was cached for the endpoint
    pub fn insert(&mut self, endpoint: &str, payload: Arc<Value>, fetched_at: DateTime<Utc>) {
        self.entries.insert(endpoint.to_string(), CacheEntry { payload, fetched_at });
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        info!("Cache cleared ({} entries)", removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            fresh_entries: self.entries.values().filter(|e| e.age(now) < self.ttl).count(),
            ttl_secs: self.ttl.num_seconds(),
            oldest_fetch: self.entries.values().map(|e| e.fetched_at).min(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh_entries: usize,
    pub ttl_secs: i64,
    pub oldest_fetch: Option<DateTime<Utc>>,
}
