//! Memoization of subgraph extraction keyed by (window, bucket).
//!
//! Keys are exact: two overlapping-but-not-identical windows are
//! distinct entries. That is an intentional simplification: the
//! boundary layer derives windows deterministically from the request
//! pair, so repeated queries hit.
//!
//! Policy decisions:
//! - bounded LRU eviction with a configurable entry count, `None` for
//!   unbounded;
//! - single-flight extraction: concurrent misses on one key collapse
//!   into one store round-trip via an in-flight registry. Waiters
//!   re-check after the builder finishes and take over building if it
//!   failed, so a `NoDataInRegion` outcome is never cached as a graph.

use std::sync::{Arc, Condvar, Mutex};

use hashbrown::HashMap;
use log::debug;

use crate::Error;
use crate::extract::extract_subgraph;
use crate::model::{RouteGraph, TimeBucket};
use crate::store::{BoundingBox, GraphStore};

/// Exact (window, bucket) key. Float bounds are compared bitwise so
/// the key can implement `Eq`/`Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    min_lat: u64,
    max_lat: u64,
    min_lon: u64,
    max_lon: u64,
    bucket: TimeBucket,
}

impl CacheKey {
    pub fn new(bbox: &BoundingBox, bucket: TimeBucket) -> Self {
        Self {
            min_lat: bbox.min_lat.to_bits(),
            max_lat: bbox.max_lat.to_bits(),
            min_lon: bbox.min_lon.to_bits(),
            max_lon: bbox.max_lon.to_bits(),
            bucket,
        }
    }
}

struct Entry {
    graph: Arc<RouteGraph>,
    last_used: u64,
}

#[derive(Default)]
struct Flight {
    done: Mutex<bool>,
    ready: Condvar,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    in_flight: HashMap<CacheKey, Arc<Flight>>,
    clock: u64,
}

/// Shared subgraph cache. Published graphs are `Arc`-shared and
/// read-only from then on.
pub struct SubgraphCache {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
}

impl SubgraphCache {
    /// `capacity` is the maximum number of retained subgraphs; `None`
    /// disables eviction.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
        }
    }

    /// Cached subgraph for the exact key, bumping its recency.
    pub fn get(&self, bbox: &BoundingBox, bucket: TimeBucket) -> Option<Arc<RouteGraph>> {
        let key = CacheKey::new(bbox, bucket);
        let mut inner = self.lock();
        Self::lookup(&mut inner, &key)
    }

    /// Publishes a subgraph, evicting the least-recently-used entry
    /// when at capacity.
    pub fn put(&self, bbox: &BoundingBox, bucket: TimeBucket, graph: Arc<RouteGraph>) {
        let key = CacheKey::new(bbox, bucket);
        let mut inner = self.lock();
        self.insert_locked(&mut inner, key, graph);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached subgraph for (window, bucket) or extracts it
    /// from the store, collapsing concurrent identical misses into one
    /// extraction.
    ///
    /// # Errors
    ///
    /// Propagates extraction errors; failed outcomes are not cached.
    pub fn get_or_extract(
        &self,
        store: &dyn GraphStore,
        bbox: &BoundingBox,
        bucket: TimeBucket,
    ) -> Result<Arc<RouteGraph>, Error> {
        let key = CacheKey::new(bbox, bucket);
        loop {
            let mut inner = self.lock();
            if let Some(graph) = Self::lookup(&mut inner, &key) {
                debug!("Subgraph cache hit for {bucket} over {bbox:?}");
                return Ok(graph);
            }
            match inner.in_flight.get(&key).map(Arc::clone) {
                Some(flight) => {
                    // Another request is extracting this key: wait for
                    // it, then retry the lookup from scratch. If the
                    // builder failed this caller becomes the builder.
                    drop(inner);
                    let mut done = flight.done.lock().expect("cache flight lock poisoned");
                    while !*done {
                        done = flight.ready.wait(done).expect("cache flight lock poisoned");
                    }
                }
                None => {
                    let flight = Arc::new(Flight::default());
                    inner.in_flight.insert(key, Arc::clone(&flight));
                    drop(inner);
                    return self.build(store, bbox, bucket, key, &flight);
                }
            }
        }
    }

    fn build(
        &self,
        store: &dyn GraphStore,
        bbox: &BoundingBox,
        bucket: TimeBucket,
        key: CacheKey,
        flight: &Flight,
    ) -> Result<Arc<RouteGraph>, Error> {
        // Extraction runs outside the cache lock so unrelated keys
        // proceed concurrently.
        let result = extract_subgraph(store, bbox, bucket);

        let mut inner = self.lock();
        inner.in_flight.remove(&key);
        let outcome = match result {
            Ok(graph) => {
                let graph = Arc::new(graph);
                self.insert_locked(&mut inner, key, Arc::clone(&graph));
                Ok(graph)
            }
            // NoDataInRegion and store failures must not mask a region
            // that later gains data, so nothing is stored.
            Err(e) => Err(e),
        };
        drop(inner);

        *flight.done.lock().expect("cache flight lock poisoned") = true;
        flight.ready.notify_all();
        outcome
    }

    fn lookup(inner: &mut Inner, key: &CacheKey) -> Option<Arc<RouteGraph>> {
        inner.clock += 1;
        let clock = inner.clock;
        inner.entries.get_mut(key).map(|entry| {
            entry.last_used = clock;
            Arc::clone(&entry.graph)
        })
    }

    fn insert_locked(&self, inner: &mut Inner, key: CacheKey, graph: Arc<RouteGraph>) {
        if let Some(capacity) = self.capacity {
            while inner.entries.len() >= capacity.max(1) && !inner.entries.contains_key(&key) {
                // Capacity stays small; a linear scan beats the
                // bookkeeping of an intrusive LRU list here.
                let Some(oldest) = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(k, _)| *k)
                else {
                    break;
                };
                inner.entries.remove(&oldest);
                debug!("Evicted least-recently-used subgraph");
            }
        }
        inner.clock += 1;
        let clock = inner.clock;
        inner.entries.insert(
            key,
            Entry {
                graph,
                last_used: clock,
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("subgraph cache lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn bbox(min_lat: f64) -> BoundingBox {
        BoundingBox {
            min_lat,
            max_lat: min_lat + 1.0,
            min_lon: 0.0,
            max_lon: 1.0,
        }
    }

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        for i in 0..20 {
            store.insert_node(i, f64::from(i as i32) * 0.5, 0.5);
        }
        store
    }

    #[test]
    fn miss_then_hit_returns_same_graph() {
        let store = seeded_store();
        let cache = SubgraphCache::new(Some(4));
        let window = bbox(0.0);

        let first = cache
            .get_or_extract(&store, &window, TimeBucket::H09)
            .unwrap();
        let second = cache
            .get_or_extract(&store, &window, TimeBucket::H09)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_bucket_is_a_different_entry() {
        let store = seeded_store();
        let cache = SubgraphCache::new(Some(4));
        let window = bbox(0.0);

        let morning = cache
            .get_or_extract(&store, &window, TimeBucket::H09)
            .unwrap();
        let night = cache
            .get_or_extract(&store, &window, TimeBucket::H21)
            .unwrap();
        assert!(!Arc::ptr_eq(&morning, &night));
        assert_eq!(morning.node_count(), night.node_count());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn no_data_outcome_is_not_cached() {
        let store = seeded_store();
        let cache = SubgraphCache::new(Some(4));
        let empty = bbox(500.0);

        assert!(matches!(
            cache.get_or_extract(&store, &empty, TimeBucket::H00),
            Err(Error::NoDataInRegion)
        ));
        assert!(cache.get(&empty, TimeBucket::H00).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn evicts_least_recently_used_at_capacity() {
        let store = seeded_store();
        let cache = SubgraphCache::new(Some(2));

        let a = bbox(0.0);
        let b = bbox(1.0);
        let c = bbox(2.0);
        cache.get_or_extract(&store, &a, TimeBucket::H00).unwrap();
        cache.get_or_extract(&store, &b, TimeBucket::H00).unwrap();
        // Touch `a` so `b` is the eviction candidate.
        assert!(cache.get(&a, TimeBucket::H00).is_some());
        cache.get_or_extract(&store, &c, TimeBucket::H00).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a, TimeBucket::H00).is_some());
        assert!(cache.get(&b, TimeBucket::H00).is_none());
        assert!(cache.get(&c, TimeBucket::H00).is_some());
    }

    #[test]
    fn concurrent_misses_collapse_into_one_extraction() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingStore {
            inner: MemoryStore,
            node_queries: AtomicUsize,
        }

        impl GraphStore for CountingStore {
            fn nodes_in_bbox(
                &self,
                bbox: &BoundingBox,
            ) -> Result<Vec<crate::store::NodeRow>, Error> {
                self.node_queries.fetch_add(1, Ordering::SeqCst);
                // Widen the race window.
                std::thread::sleep(std::time::Duration::from_millis(20));
                self.inner.nodes_in_bbox(bbox)
            }

            fn edges_between(
                &self,
                node_ids: &[i64],
                bucket: TimeBucket,
            ) -> Result<Vec<crate::store::EdgeRow>, Error> {
                self.inner.edges_between(node_ids, bucket)
            }
        }

        let store = CountingStore {
            inner: seeded_store(),
            node_queries: AtomicUsize::new(0),
        };
        let cache = SubgraphCache::new(Some(4));
        let window = bbox(0.0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_extract(&store, &window, TimeBucket::H12)
                        .unwrap();
                });
            }
        });

        assert_eq!(store.node_queries.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }
}
