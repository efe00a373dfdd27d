//! Concurrent cache of remapped quads keyed by face and connectivity signature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use glassmesh_core::{ConnectivitySignature, Direction, ModelError, QuadList};

/// One partition per face plus one for the directionless query.
const PARTITIONS: usize = Direction::COUNT + 1;
const DIRECTIONLESS: usize = Direction::COUNT;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadCacheStats {
    /// Requests answered from a populated entry.
    pub hits: u64,
    /// Requests that had to run the computation.
    pub misses: u64,
    /// Computations that produced a stored quad list.
    pub computations: u64,
    /// Populated entries across all partitions.
    pub entries: usize,
}

/// A cache entry. `compute` serializes the single computation for its key;
/// readers of a populated entry never touch it.
#[derive(Default)]
struct Slot {
    quads: OnceLock<QuadList>,
    compute: Mutex<()>,
}

#[derive(Default)]
struct Partition {
    slots: RwLock<HashMap<ConnectivitySignature, Arc<Slot>>>,
}

impl Partition {
    fn lookup(&self, signature: ConnectivitySignature) -> Option<Arc<Slot>> {
        // Entries are append-only, so a poisoned map is still consistent.
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&signature)
            .cloned()
    }

    fn slot(&self, signature: ConnectivitySignature) -> Arc<Slot> {
        if let Some(slot) = self.lookup(signature) {
            return slot;
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(signature).or_default())
    }

    fn populated(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.quads.get().is_some())
            .count()
    }
}

/// Remapped quad lists keyed by face and connectivity signature.
///
/// Entries are computed at most once per key and are never evicted for the
/// lifetime of the cache. Partitions are independent: work on one face never
/// waits on another.
pub struct QuadCache {
    partitions: [Partition; PARTITIONS],
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl QuadCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            partitions: std::array::from_fn(|_| Partition::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    fn partition(&self, side: Option<Direction>) -> &Partition {
        &self.partitions[side.map_or(DIRECTIONLESS, Direction::index)]
    }

    /// Retrieve the quads if they're cached.
    pub fn get(&self, side: Option<Direction>, signature: ConnectivitySignature) -> Option<QuadList> {
        self.partition(side)
            .lookup(signature)?
            .quads
            .get()
            .cloned()
    }

    /// Return the cached quads for the key, running `compute` on a miss.
    ///
    /// Concurrent callers for the same key wait for the first computation
    /// instead of repeating it. A failed computation stores nothing and the
    /// error is returned to the caller that ran it.
    pub fn get_or_compute<F>(
        &self,
        side: Option<Direction>,
        signature: ConnectivitySignature,
        compute: F,
    ) -> Result<QuadList, ModelError>
    where
        F: FnOnce() -> Result<QuadList, ModelError>,
    {
        let partition = self.partition(side);
        if let Some(quads) = partition
            .lookup(signature)
            .and_then(|slot| slot.quads.get().cloned())
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(quads);
        }

        let slot = partition.slot(signature);
        let _guard = slot.compute.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(quads) = slot.quads.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(quads.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let quads = compute()?;
        if slot.quads.set(quads).is_ok() {
            self.computations.fetch_add(1, Ordering::Relaxed);
        }
        slot.quads
            .get()
            .cloned()
            .ok_or(ModelError::MissingQuads { side })
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Partition::populated).sum()
    }

    /// Whether no entry has been populated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> QuadCacheStats {
        QuadCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for QuadCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;

    use glassmesh_core::VertexFormatError;
    use glassmesh_testkit::{quad_with_uvs, sprite_at};

    use super::*;

    fn list(count: usize) -> QuadList {
        let sprite = sprite_at("glass", [0, 0], 16, [16, 16]);
        (0..count)
            .map(|_| quad_with_uvs(&sprite, Direction::Up, [[0.0, 0.0]; 4]))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn cache_only_computes_once_per_key() {
        let cache = QuadCache::new();
        let signature = ConnectivitySignature::from_raw(7);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(list(2))
        };

        let a = cache.get_or_compute(Some(Direction::Up), signature, compute).unwrap();
        let b = cache.get_or_compute(Some(Direction::Up), signature, compute).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.computations, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn partitions_are_keyed_by_side() {
        let cache = QuadCache::new();
        let signature = ConnectivitySignature::NONE;
        cache.get_or_compute(Some(Direction::Up), signature, || Ok(list(1))).unwrap();
        cache.get_or_compute(None, signature, || Ok(list(3))).unwrap();

        assert_eq!(cache.get(Some(Direction::Up), signature).unwrap().len(), 1);
        assert_eq!(cache.get(None, signature).unwrap().len(), 3);
        assert!(cache.get(Some(Direction::Down), signature).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn empty_results_are_cached() {
        let cache = QuadCache::new();
        let quads = cache
            .get_or_compute(Some(Direction::North), ConnectivitySignature::NONE, || Ok(list(0)))
            .unwrap();
        assert!(quads.is_empty());
        let cached = cache.get(Some(Direction::North), ConnectivitySignature::NONE);
        assert_eq!(cached.map(|q| q.len()), Some(0));
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = QuadCache::new();
        let signature = ConnectivitySignature::from_raw(3);
        let err = cache
            .get_or_compute(None, signature, || {
                Err(ModelError::Format(VertexFormatError::MissingUv))
            })
            .unwrap_err();
        assert_eq!(err, ModelError::Format(VertexFormatError::MissingUv));
        assert!(cache.get(None, signature).is_none());
        assert!(cache.is_empty());

        let quads = cache.get_or_compute(None, signature, || Ok(list(1))).unwrap();
        assert_eq!(quads.len(), 1);
    }

    #[test]
    fn concurrent_requests_share_one_computation() {
        const THREADS: usize = 8;
        let cache = QuadCache::new();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let signature = ConnectivitySignature::from_raw(42);

        let results: Vec<QuadList> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_compute(Some(Direction::West), signature, || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(std::time::Duration::from_millis(5));
                                Ok(list(4))
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for quads in &results {
            assert!(Arc::ptr_eq(quads, &results[0]));
        }
        assert_eq!(cache.stats().computations, 1);
    }
}
