// Bounded memoization for team-stats queries.
//
// Interactive sessions re-query the same handful of squads; the cache keeps
// those aggregates warm, with LRU eviction bounding its size. Each engine
// instance owns its own cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Distinct squad combinations kept warm per engine instance.
pub const TEAM_STATS_CACHE_CAPACITY: usize = 32;

/// LRU map from a sorted name list to the averaged metrics computed for it.
///
/// The mutex serializes lookup and insertion, so concurrent readers of one
/// engine share the cache and at most one computation per key is in flight.
#[derive(Debug)]
pub struct TeamStatsCache {
    inner: Mutex<LruCache<Vec<String>, HashMap<String, f64>>>,
}

impl TeamStatsCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity is non-zero");
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Return the cached value for `key`, computing and inserting it on a
    /// miss. The lock is held across `compute`; aggregates are in-memory and
    /// near-instant, so the coarse critical section is fine.
    pub fn get_or_insert_with<F>(&self, key: Vec<String>, compute: F) -> HashMap<String, f64>
    where
        F: FnOnce() -> HashMap<String, f64>,
    {
        let mut cache = self.inner.lock().expect("team stats cache mutex poisoned");
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }
        let value = compute();
        cache.put(key, value.clone());
        value
    }

    /// Number of cached squad combinations.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("team stats cache mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is currently cached, without touching recency.
    pub fn contains(&self, key: &[String]) -> bool {
        self.inner
            .lock()
            .expect("team stats cache mutex poisoned")
            .peek(key)
            .is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn stats(v: f64) -> HashMap<String, f64> {
        HashMap::from([("pace".to_string(), v)])
    }

    #[test]
    fn computes_once_per_key() {
        let cache = TeamStatsCache::new(4);
        let calls = AtomicUsize::new(0);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            stats(1.0)
        };

        let first = cache.get_or_insert_with(key(&["A", "B"]), compute);
        let second = cache.get_or_insert_with(key(&["A", "B"]), || {
            calls.fetch_add(1, Ordering::SeqCst);
            stats(2.0)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used_at_capacity() {
        let cache = TeamStatsCache::new(2);

        cache.get_or_insert_with(key(&["A"]), || stats(1.0));
        cache.get_or_insert_with(key(&["B"]), || stats(2.0));

        // Touch A so B becomes the eviction candidate.
        cache.get_or_insert_with(key(&["A"]), || stats(99.0));
        cache.get_or_insert_with(key(&["C"]), || stats(3.0));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key(&["A"])));
        assert!(!cache.contains(&key(&["B"])));
        assert!(cache.contains(&key(&["C"])));
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let cache = TeamStatsCache::new(0);
        cache.get_or_insert_with(key(&["A"]), || stats(1.0));
        assert_eq!(cache.len(), 1);
    }
}
