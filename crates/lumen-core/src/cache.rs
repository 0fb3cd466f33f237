//! Bounded-TTL cache
//!
//! Entries expire `ttl` after insertion. When the cache is full the oldest
//! entry is evicted to make room. Expiry is measured against the injected
//! [`Clock`], never wall time directly.

use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// One year; longer TTLs are truncated
const MAX_TTL_SECS: u64 = 365 * 24 * 3600;

/// Cache sizing, shared by every cache the engine builds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether analysis results are cached at all
    pub enabled: bool,
    /// Seconds an entry stays valid
    pub ttl_secs: u64,
    /// Maximum number of live entries
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: 256,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            clock,
            entries: HashMap::new(),
        }
    }

    /// Build from config using wall-clock time
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::seconds(config.ttl_secs.min(MAX_TTL_SECS) as i64);
        Self::new(ttl, config.max_entries, clock)
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.purge_expired();
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.purge_expired();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(victim) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&victim);
            }
        }
        let inserted_at = self.clock.now();
        self.entries.insert(key, CacheEntry { value, inserted_at });
    }

    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live (unexpired) entries
    pub fn len(&mut self) -> usize {
        self.purge_expired();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn purge_expired(&mut self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.inserted_at < ttl);
    }
}
