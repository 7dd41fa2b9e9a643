//! Time-bounded memoisation of orchestrator results.
//!
//! Expiry is lazy: [`ResultCache::get`] treats a stale entry as absent but
//! leaves it in place until [`ResultCache::sweep_expired`] runs or a later
//! [`ResultCache::put`] overwrites it. There is no size bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
}

/// Shared, clock-driven TTL cache. Cloning shares the underlying map.
#[derive(Clone)]
pub struct ResultCache<V> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovered from poisoned cache mutex");
            poisoned.into_inner()
        })
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        (now - entry.created_at)
            .to_std()
            // A creation time in the future (clock stepped back) counts as fresh.
            .map_or(true, |age| age < self.ttl)
    }

    /// Value for `key` if present and younger than the TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.lock_inner();
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite; the entry's age restarts at zero.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let created_at = self.clock.now();
        self.lock_inner()
            .insert(key.into(), CacheEntry { value, created_at });
    }

    /// Physically drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock_inner();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "Swept expired cache entries");
        }
        removed
    }

    pub fn clear(&self) {
        self.lock_inner().clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_inner().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
