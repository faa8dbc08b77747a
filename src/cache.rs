//! Result cache keyed by the debounced query
//!
//! Entries go stale after `stale_time` (still served, but a refetch is due)
//! and are dropped once unused for `gc_time`.

use crate::catalog::Product;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Fresh(Arc<Vec<Product>>),
    Stale(Arc<Vec<Product>>),
    Miss,
}

#[derive(Debug)]
struct CacheEntry {
    products: Arc<Vec<Product>>,
    fetched_at: Instant,
    last_used: Instant,
}

pub struct QueryCache {
    entries: LruCache<String, CacheEntry>,
    stale_time: Duration,
    gc_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration, gc_time: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stale_time,
            gc_time,
        }
    }

    pub fn insert(&mut self, key: &str, products: Vec<Product>, now: Instant) -> Arc<Vec<Product>> {
        let products = Arc::new(products);
        self.entries.put(
            key.to_string(),
            CacheEntry {
                products: Arc::clone(&products),
                fetched_at: now,
                last_used: now,
            },
        );
        products
    }

    pub fn lookup(&mut self, key: &str, now: Instant) -> CacheLookup {
        let expired = match self.entries.peek(key) {
            Some(entry) => now.saturating_duration_since(entry.last_used) >= self.gc_time,
            None => return CacheLookup::Miss,
        };
        if expired {
            debug!("Dropping expired cache entry for '{}'", key);
            self.entries.pop(key);
            return CacheLookup::Miss;
        }

        let Some(entry) = self.entries.get_mut(key) else {
            return CacheLookup::Miss;
        };
        entry.last_used = now;
        let products = Arc::clone(&entry.products);
        if now.saturating_duration_since(entry.fetched_at) < self.stale_time {
            CacheLookup::Fresh(products)
        } else {
            CacheLookup::Stale(products)
        }
    }

    /// When the entry for `key` was fetched, if cached
    pub fn fetched_at(&self, key: &str) -> Option<Instant> {
        self.entries.peek(key).map(|e| e.fetched_at)
    }

    /// Drop every entry idle for at least `gc_time`. Returns how many went.
    pub fn collect_garbage(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.last_used) >= self.gc_time)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.entries.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    const STALE: Duration = Duration::from_secs(60);
    const GC: Duration = Duration::from_secs(300);

    fn cache() -> QueryCache {
        QueryCache::new(STALE, GC, 4)
    }

    #[test]
    fn fresh_then_stale() {
        let t0 = Instant::now();
        let mut c = cache();
        c.insert("bag", vec![product(1, "Bag", "men's clothing")], t0);

        assert!(matches!(c.lookup("bag", t0 + Duration::from_secs(59)), CacheLookup::Fresh(p) if p.len() == 1));
        assert!(matches!(c.lookup("bag", t0 + STALE), CacheLookup::Stale(_)));
        assert_eq!(c.lookup("shoe", t0), CacheLookup::Miss);
    }

    #[test]
    fn keys_are_exact_query_strings() {
        let t0 = Instant::now();
        let mut c = cache();
        c.insert("Bag", Vec::new(), t0);
        assert_eq!(c.lookup("bag", t0), CacheLookup::Miss);
        assert!(matches!(c.lookup("Bag", t0), CacheLookup::Fresh(_)));
    }

    #[test]
    fn unused_entries_are_collected() {
        let t0 = Instant::now();
        let mut c = cache();
        c.insert("a", Vec::new(), t0);
        c.insert("b", Vec::new(), t0);

        // touching "b" keeps it alive
        let _ = c.lookup("b", t0 + Duration::from_secs(200));
        assert_eq!(c.collect_garbage(t0 + GC), 1);
        assert_eq!(c.len(), 1);
        assert_eq!(c.lookup("a", t0 + GC), CacheLookup::Miss);
    }

    #[test]
    fn expired_entry_is_a_miss_on_lookup() {
        let t0 = Instant::now();
        let mut c = cache();
        c.insert("ring", Vec::new(), t0);
        assert_eq!(c.lookup("ring", t0 + GC), CacheLookup::Miss);
        assert!(c.is_empty());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let t0 = Instant::now();
        let mut c = QueryCache::new(STALE, GC, 2);
        c.insert("a", Vec::new(), t0);
        c.insert("b", Vec::new(), t0);
        let _ = c.lookup("a", t0);
        c.insert("c", Vec::new(), t0);

        assert_eq!(c.lookup("b", t0), CacheLookup::Miss);
        assert!(matches!(c.lookup("a", t0), CacheLookup::Fresh(_)));
    }

    #[test]
    fn reinsert_refreshes_timestamp() {
        let t0 = Instant::now();
        let mut c = cache();
        c.insert("bag", Vec::new(), t0);
        c.insert("bag", Vec::new(), t0 + STALE);
        assert_eq!(c.fetched_at("bag"), Some(t0 + STALE));
        assert!(matches!(c.lookup("bag", t0 + STALE), CacheLookup::Fresh(_)));
    }
}
