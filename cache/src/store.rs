use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, instrument, warn};

/// Bounded in-memory cache with per-entry sliding TTL.
///
/// Guarantees:
/// - Memory usage is bounded by `capacity`; inserting a new key at
///   capacity evicts the least-recently-used entry first.
/// - A successful `get` re-arms the entry's TTL and marks it most
///   recently used, so warm entries stay warm.
/// - Operations are infallible; the worst outcome is a miss, and
///   correctness falls back to the system of record.
///
/// Callers pass `now_ms` explicitly so expiry is deterministic in tests.
pub struct BoundedTtlCache<V> {
    capacity: usize,

    /// Entry storage by key.
    map: Mutex<HashMap<String, Entry<V>>>,
    /// Recency order, least-recently-used at the front.
    lru: Mutex<VecDeque<String>>,
}

struct Entry<V> {
    value: V,
    expires_at_ms: u64,
    ttl_ms: u64,
}

/// Point-in-time size/capacity snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}

impl<V: Clone> BoundedTtlCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: Mutex::new(HashMap::new()),
            lru: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns a cloned value if the key is present and not expired.
    ///
    /// A hit slides the expiry forward by the entry's original TTL and
    /// bumps the key to most recently used. An expired entry is removed
    /// and reported as a miss.
    pub fn get(&self, key: &str, now_ms: u64) -> Option<V> {
        let mut map = self.map.lock();
        let mut lru = self.lru.lock();

        let Some(entry) = map.get_mut(key) else {
            debug!(key, "cache miss");
            return None;
        };

        if now_ms >= entry.expires_at_ms {
            map.remove(key);
            lru.retain(|k| k != key);
            debug!(key, "cache entry expired");
            return None;
        }

        entry.expires_at_ms = now_ms.saturating_add(entry.ttl_ms);
        let value = entry.value.clone();

        lru.retain(|k| k != key);
        lru.push_back(key.to_string());

        Some(value)
    }

    /// Insert or replace an entry, evicting the LRU entry if a new key
    /// would exceed capacity.
    pub fn set(&self, key: impl Into<String>, value: V, ttl_ms: u64, now_ms: u64) {
        let key = key.into();
        let mut map = self.map.lock();
        let mut lru = self.lru.lock();

        let is_new = !map.contains_key(&key);

        if is_new && map.len() >= self.capacity {
            let Some(victim) = lru.pop_front() else {
                // This state shouldn't be reachable if capacity > 0
                warn!(key, "cache full with empty recency ring");
                return;
            };

            map.remove(&victim);

            info!(
                evicted_key = %victim,
                cache_size = map.len(),
                "cache capacity reached; evicted least-recently-used entry"
            );
        }

        map.insert(
            key.clone(),
            Entry {
                value,
                expires_at_ms: now_ms.saturating_add(ttl_ms),
                ttl_ms,
            },
        );

        lru.retain(|k| *k != key);
        lru.push_back(key);
    }

    /// Remove a single entry. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut map = self.map.lock();
        let mut lru = self.lru.lock();

        let removed = map.remove(key).is_some();
        if removed {
            lru.retain(|k| k != key);
            debug!(key, "cache entry deleted");
        }
        removed
    }

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// Used to drop all filter-key variants of one entity at once.
    pub fn delete_prefix(&self, prefix: &str) -> usize {
        let mut map = self.map.lock();
        let mut lru = self.lru.lock();

        let victims: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        for key in &victims {
            map.remove(key);
        }
        lru.retain(|k| !k.starts_with(prefix));

        if !victims.is_empty() {
            debug!(prefix, removed = victims.len(), "cache prefix deleted");
        }
        victims.len()
    }

    /// Drop every entry. Returns the number removed.
    #[instrument(skip(self), target = "cache")]
    pub fn clear(&self) -> usize {
        let mut map = self.map.lock();
        let mut lru = self.lru.lock();

        let count = map.len();
        map.clear();
        lru.clear();

        info!(count, "cache cleared");
        count
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.map.lock().len(),
            capacity: self.capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: u64 = 1_000;

    #[test]
    fn set_then_get_before_ttl_hits() {
        let cache = BoundedTtlCache::new(10);
        cache.set("k", 7u32, TTL, 0);

        assert_eq!(cache.get("k", 500), Some(7));
    }

    #[test]
    fn entry_expires_after_ttl_without_reads() {
        let cache = BoundedTtlCache::new(10);
        cache.set("k", 7u32, TTL, 0);

        assert_eq!(cache.get("k", 1_000), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn get_slides_expiry_forward() {
        let cache = BoundedTtlCache::new(10);
        cache.set("k", 7u32, TTL, 0);

        // Read at 900 re-arms the TTL to 1900.
        assert_eq!(cache.get("k", 900), Some(7));
        assert_eq!(cache.get("k", 1_500), Some(7));
        assert_eq!(cache.get("k", 2_600), None);
    }

    #[test]
    fn lru_eviction_at_capacity() {
        let cache = BoundedTtlCache::new(2);
        cache.set("team:1", 1u32, TTL, 0);
        cache.set("team:2", 2u32, TTL, 0);
        cache.set("team:3", 3u32, TTL, 0);

        assert_eq!(cache.get("team:1", 1), None);
        assert_eq!(cache.get("team:2", 1), Some(2));
        assert_eq!(cache.get("team:3", 1), Some(3));
    }

    #[test]
    fn get_bumps_recency_so_read_entries_survive_eviction() {
        let cache = BoundedTtlCache::new(2);
        cache.set("a", 1u32, TTL, 0);
        cache.set("b", 2u32, TTL, 0);

        // "a" becomes most recently used; inserting "c" should evict "b".
        assert_eq!(cache.get("a", 1), Some(1));
        cache.set("c", 3u32, TTL, 2);

        assert_eq!(cache.get("a", 3), Some(1));
        assert_eq!(cache.get("b", 3), None);
        assert_eq!(cache.get("c", 3), Some(3));
    }

    #[test]
    fn replacing_existing_key_does_not_evict() {
        let cache = BoundedTtlCache::new(2);
        cache.set("a", 1u32, TTL, 0);
        cache.set("b", 2u32, TTL, 0);
        cache.set("a", 10u32, TTL, 1);

        assert_eq!(cache.get("a", 2), Some(10));
        assert_eq!(cache.get("b", 2), Some(2));
    }

    #[test]
    fn delete_removes_only_the_named_entry() {
        let cache = BoundedTtlCache::new(10);
        cache.set("a", 1u32, TTL, 0);
        cache.set("b", 2u32, TTL, 0);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.get("b", 1), Some(2));
    }

    #[test]
    fn delete_prefix_drops_all_variants() {
        let cache = BoundedTtlCache::new(10);
        cache.set("league:7:all", 1u32, TTL, 0);
        cache.set("league:7:month=05", 2u32, TTL, 0);
        cache.set("league:8:all", 3u32, TTL, 0);

        assert_eq!(cache.delete_prefix("league:7:"), 2);
        assert_eq!(cache.get("league:8:all", 1), Some(3));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_reports_removed_count() {
        let cache = BoundedTtlCache::new(10);
        cache.set("a", 1u32, TTL, 0);
        cache.set("b", 2u32, TTL, 0);

        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.get("a", 1), None);
    }

    #[test]
    fn stats_reflects_size_and_capacity() {
        let cache = BoundedTtlCache::new(5);
        cache.set("a", 1u32, TTL, 0);

        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 1,
                capacity: 5
            }
        );
    }
}
