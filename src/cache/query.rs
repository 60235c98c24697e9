// Memoized query results keyed by query text.
// Entries live as long as the cache object; nothing is evicted.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::Result;

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Query-result cache.
///
/// The key is the literal query string, so `"SELECT 1"` and `"select 1"` are
/// different entries. Growth is unbounded and there is no internal locking;
/// share it across threads only behind an external lock.
#[derive(Debug, Clone)]
pub struct QueryCache<T> {
    entries: HashMap<String, T>,
    stats: CacheStats,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `key`, if any. Does not touch the counters.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<T: Clone> QueryCache<T> {
    /// Return the cached result for `key`, or run `compute` and store its result.
    ///
    /// A failed `compute` stores nothing, so the next call for the same key
    /// computes again.
    pub fn get_or_compute<F>(&mut self, key: &str, compute: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(result) = self.entries.get(key) {
            self.stats.hits += 1;
            info!(query = key, "using cached result");
            return Ok(result.clone());
        }

        self.stats.misses += 1;
        info!(query = key, "executing query and caching result");
        let result = compute()?;
        self.entries.insert(key.to_string(), result.clone());
        debug!(entries = self.entries.len(), "query cache grew");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProdevError;

    #[test]
    fn test_miss_then_hit() {
        let mut cache = QueryCache::new();
        let mut calls = 0;

        let first = cache
            .get_or_compute("Q1", || {
                calls += 1;
                Ok(vec![1, 2, 3])
            })
            .unwrap();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(calls, 1);

        let second = cache
            .get_or_compute("Q1", || {
                calls += 1;
                Ok(vec![9])
            })
            .unwrap();
        assert_eq!(second, vec![1, 2, 3]);
        assert_eq!(calls, 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_compute_runs_at_most_once_per_key() {
        let mut cache = QueryCache::new();
        let mut calls = 0;

        for _ in 0..10 {
            cache
                .get_or_compute("SELECT * FROM user_data", || {
                    calls += 1;
                    Ok(42)
                })
                .unwrap();
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut cache = QueryCache::new();
        let mut calls = 0;
        let mut compute = |value: &str| -> Result<String> {
            calls += 1;
            Ok(value.to_string())
        };

        let a = cache.get_or_compute("A", || compute("a")).unwrap();
        let b = cache.get_or_compute("B", || compute("b")).unwrap();

        assert_eq!(a, "a");
        assert_eq!(b, "b");
        assert_eq!(calls, 2);
        assert_eq!(cache.get("A").map(String::as_str), Some("a"));
        assert_eq!(cache.get("B").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let mut cache = QueryCache::new();
        cache.get_or_compute("SELECT 1", || Ok(1)).unwrap();
        cache.get_or_compute("select 1", || Ok(2)).unwrap();
        cache.get_or_compute("SELECT  1", || Ok(3)).unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("select 1"), Some(&2));
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let mut cache: QueryCache<i32> = QueryCache::new();

        let err = cache.get_or_compute("Q", || Err(ProdevError::Other("boom".into())));
        assert!(err.is_err());
        assert!(!cache.contains("Q"));

        let ok = cache.get_or_compute("Q", || Ok(7)).unwrap();
        assert_eq!(ok, 7);
        assert_eq!(cache.stats().misses, 2);
    }
}
