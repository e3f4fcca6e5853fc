//! Expiring key/value cache with lazy eviction.
//!
//! Used both as the response-memoization cache (keyed by query signature)
//! and as a secondary telemetry store. Eviction happens on access only;
//! there is no background sweep.

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct CacheEntry<V> {
    value: V,
    /// `None` means the entry never expires via the TTL mechanism; only an
    /// overwrite or `clear` removes it.
    expires_at: Option<Instant>,
}

/// Concurrent TTL cache.
///
/// Backed by a sharded map, so a `get` racing a `set` on the same key
/// observes either the old or the new entry, never a partial one, and
/// unrelated keys do not contend on a global lock.
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store `value` under `key`.
    ///
    /// With a `ttl` the entry expires `ttl` from now; without one, any prior
    /// expiry for the key is cleared and the entry becomes non-expiring.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|t| Instant::now() + t);
        self.entries.insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Fetch the value for `key`, evicting it first if its TTL has lapsed.
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => match entry.expires_at {
                Some(deadline) if Instant::now() > deadline => true,
                _ => return Some(entry.value.clone()),
            },
        };
        // The guard must be dropped before removal to avoid self-deadlock
        // on the shard lock.
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Remove all entries and expiries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
