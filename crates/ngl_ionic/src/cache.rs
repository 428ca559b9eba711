//! Capacity-bounded memoization for raw declaration data.

use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

/// Hit, miss and eviction counters of a [`BoundedCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
}

/// A map that holds at most `capacity` entries, evicting the least recently
/// added one when full.
///
/// Replacing an existing key keeps its position. Eviction only ever costs a
/// re-read; callers must be able to rebuild any entry.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: IndexMap<K, V>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Creates an empty cache. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: IndexMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Looks up `key`, counting the hit or miss.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Inserts or replaces an entry, evicting the oldest one if full.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }
        while self.entries.len() >= self.capacity {
            if self.entries.shift_remove_index(0).is_none() {
                break;
            }
            self.stats.evictions += 1;
        }
        self.entries.insert(key, value);
    }

    /// Returns `true` if `key` is cached. Does not touch the counters.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The counters so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_added() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);
        assert!(!cache.contains_key(&"a"));
        assert!(cache.contains_key(&"b"));
        assert!(cache.contains_key(&"c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn replacing_keeps_position() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        cache.insert("c", 3);
        assert!(!cache.contains_key(&"a"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn counts_hits_and_misses() {
        let mut cache: BoundedCache<&str, i32> = BoundedCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.get(&"x").is_none());
        cache.insert("x", 1);
        assert!(cache.get(&"x").is_some());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }
}
