//! TTL- and size-bounded result store.
//!
//! Every read and write takes the store lock for the whole check-then-act
//! sequence, so a read that finds an expired entry removes it before anyone
//! else can observe it, and a write evicts and inserts atomically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::result::ExtractionResult;

#[derive(Debug)]
struct CacheEntry {
    value: ExtractionResult,
    inserted_at: Instant,
}

/// In-memory cache of extraction results keyed by URL fingerprint.
pub struct FingerprintCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    evict_count: usize,
    clock: Arc<dyn Clock>,
}

impl FingerprintCache {
    /// Create a cache backed by the system clock.
    pub fn new(ttl: Duration, max_entries: usize, evict_count: usize) -> Self {
        Self::with_clock(ttl, max_entries, evict_count, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(ttl: Duration, max_entries: usize, evict_count: usize, clock: Arc<dyn Clock>) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl, max_entries, evict_count, clock }
    }

    /// Create a cache sized and timed from application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cache_ttl(), config.cache_max_entries, config.cache_evict_count)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a fresh entry.
    ///
    /// Returns an independent copy of the stored result. An entry older than
    /// the TTL is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<ExtractionResult> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        let age = self.clock.now().saturating_duration_since(entry.inserted_at);
        if age > self.ttl {
            tracing::debug!(key, age_ms = age.as_millis() as u64, "cache entry expired");
            entries.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    /// Store a copy of `value` under `key`, stamped with the current time.
    ///
    /// When the store already holds more than `max_entries`, the
    /// `evict_count` oldest entries are dropped first.
    pub fn set(&self, key: &str, value: &ExtractionResult) {
        let mut entries = self.lock();

        if entries.len() > self.max_entries {
            let mut by_age: Vec<(Instant, String)> = entries
                .iter()
                .map(|(k, e)| (e.inserted_at, k.clone()))
                .collect();
            by_age.sort_by_key(|(inserted_at, _)| *inserted_at);

            for (_, old_key) in by_age.into_iter().take(self.evict_count) {
                entries.remove(&old_key);
            }
            tracing::debug!(remaining = entries.len(), "evicted oldest cache entries");
        }

        entries.insert(key.to_string(), CacheEntry { value: value.clone(), inserted_at: self.clock.now() });
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
