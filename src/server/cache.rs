//! In-memory snapshot cache keyed by city slug.
//!
//! Entries live for the whole process unless a TTL is configured.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::models::{CitySlug, WeatherSnapshot};

/// A cached snapshot with optional expiration time.
struct CacheEntry {
    value: Arc<WeatherSnapshot>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Arc<WeatherSnapshot>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }

    fn get(&self) -> Option<Arc<WeatherSnapshot>> {
        if self.is_expired() {
            None
        } else {
            Some(self.value.clone())
        }
    }
}

/// Cache of successful extractions.
///
/// Failures are never stored. Readers share the lock; only `put` and
/// `clear` take it exclusively.
pub struct WeatherCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl WeatherCache {
    /// Cache whose entries never expire.
    pub fn new() -> Self {
        Self::with_ttl(None)
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a cached snapshot, or None if expired/missing.
    pub fn get(&self, city: &CitySlug) -> Option<Arc<WeatherSnapshot>> {
        self.entries
            .read()
            .ok()
            .and_then(|guard| guard.get(city.cache_key()).and_then(|e| e.get()))
    }

    /// Store a snapshot, replacing any previous one for the city.
    pub fn put(&self, city: &CitySlug, snapshot: Arc<WeatherSnapshot>) {
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(
                city.cache_key().to_string(),
                CacheEntry::new(snapshot, self.ttl),
            );
            if self.ttl.is_some() {
                guard.retain(|_, entry| !entry.is_expired());
            }
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|guard| guard.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.write() {
            guard.clear();
        }
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}
