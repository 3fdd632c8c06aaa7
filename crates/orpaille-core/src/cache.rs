//! Time-expiring result cache.
//!
//! Keys are `(location, radius, kind)`; values are opaque to the cache.
//! An entry is logically absent once its age exceeds the TTL; expiry is
//! enforced lazily on read and eagerly by [`TtlCache::clear_expired`].
//! There is no size-based eviction.
//!
//! The cache is an explicitly constructed value with an injected [`Clock`],
//! so time-dependent behavior is deterministic under test.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::defaults::CACHE_TTL_SECS;

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Composite cache key: normalized location, radius in km, query kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    location: String,
    radius_km: u32,
    kind: String,
}

impl CacheKey {
    pub fn new(location: &str, radius_km: u32, kind: &str) -> Self {
        Self {
            location: location.to_lowercase(),
            radius_km,
            kind: kind.to_string(),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Process-wide result cache with a fixed time-to-live.
///
/// The `Mutex` provides interior mutability behind a shared reference;
/// callers hold the cache in an `Arc` and never observe a partially
/// applied mutation.
pub struct TtlCache<V: Clone> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the default one-hour TTL.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::seconds(CACHE_TTL_SECS))
    }

    /// Create a cache with an explicit TTL.
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Store a value, overwriting any prior entry and resetting its age.
    pub fn set(&self, key: CacheKey, value: V) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Fetch a value if present and not expired. Never fails; an expired
    /// entry is removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        let expired = match entries.get(key) {
            Some(entry) => self.clock.now() - entry.stored_at > self.ttl,
            None => return None,
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    /// Remove all entries strictly older than the TTL.
    pub fn clear_expired(&self) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, entry| now - entry.stored_at <= self.ttl);
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of stored entries, including any not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_cache() -> (Arc<ManualClock>, TtlCache<String>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = TtlCache::new(clock.clone() as Arc<dyn Clock>);
        (clock, cache)
    }

    #[test]
    fn test_set_then_get_within_ttl() {
        let (_clock, cache) = manual_cache();
        let key = CacheKey::new("Tuchan", 50, "gold_search");

        cache.set(key.clone(), "payload".to_string());
        assert_eq!(cache.get(&key), Some("payload".to_string()));
    }

    #[test]
    fn test_get_after_ttl_is_a_miss() {
        let (clock, cache) = manual_cache();
        let key = CacheKey::new("Tuchan", 50, "gold_search");

        cache.set(key.clone(), "payload".to_string());
        clock.advance(Duration::seconds(CACHE_TTL_SECS + 1));
        assert_eq!(cache.get(&key), None);
        // Lazy removal dropped the entry
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_at_exact_ttl_is_a_hit() {
        let (clock, cache) = manual_cache();
        let key = CacheKey::new("Tuchan", 50, "gold_search");

        cache.set(key.clone(), "payload".to_string());
        clock.advance(Duration::seconds(CACHE_TTL_SECS));
        assert_eq!(cache.get(&key), Some("payload".to_string()));
    }

    #[test]
    fn test_set_overwrites_and_resets_age() {
        let (clock, cache) = manual_cache();
        let key = CacheKey::new("Tuchan", 50, "gold_search");

        cache.set(key.clone(), "old".to_string());
        clock.advance(Duration::seconds(CACHE_TTL_SECS - 10));
        cache.set(key.clone(), "new".to_string());
        clock.advance(Duration::seconds(20));

        // Old timestamp would have expired; the rewrite reset it
        assert_eq!(cache.get(&key), Some("new".to_string()));
    }

    #[test]
    fn test_key_location_is_case_insensitive() {
        let (_clock, cache) = manual_cache();
        cache.set(CacheKey::new("Carcassonne", 30, "k"), "v".to_string());
        assert_eq!(
            cache.get(&CacheKey::new("carcassonne", 30, "k")),
            Some("v".to_string())
        );
    }

    #[test]
    fn test_distinct_kinds_do_not_collide() {
        let (_clock, cache) = manual_cache();
        cache.set(CacheKey::new("Tuchan", 50, "a"), "va".to_string());
        cache.set(CacheKey::new("Tuchan", 50, "b"), "vb".to_string());
        assert_eq!(cache.get(&CacheKey::new("Tuchan", 50, "a")), Some("va".to_string()));
        assert_eq!(cache.get(&CacheKey::new("Tuchan", 50, "b")), Some("vb".to_string()));
    }

    #[test]
    fn test_clear_expired_boundary() {
        let (clock, cache) = manual_cache();
        let young = CacheKey::new("young", 10, "k");
        let old = CacheKey::new("old", 10, "k");

        cache.set(old.clone(), "old".to_string());
        clock.advance(Duration::seconds(CACHE_TTL_SECS + 1));
        cache.set(young.clone(), "young".to_string());

        cache.clear_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&young), Some("young".to_string()));
        assert_eq!(cache.get(&old), None);
    }

    #[test]
    fn test_clear_expired_keeps_entry_aged_exactly_ttl() {
        let (clock, cache) = manual_cache();
        let key = CacheKey::new("edge", 10, "k");

        cache.set(key.clone(), "v".to_string());
        clock.advance(Duration::seconds(CACHE_TTL_SECS));
        cache.clear_expired();
        assert_eq!(cache.get(&key), Some("v".to_string()));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (_clock, cache) = manual_cache();
        cache.set(CacheKey::new("a", 1, "k"), "v".to_string());
        cache.set(CacheKey::new("b", 2, "k"), "v".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_manual_clock_advance() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), start + Duration::seconds(30));
    }
}
