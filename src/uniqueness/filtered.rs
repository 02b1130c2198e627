//! Bloom-filter-accelerated uniqueness store
//!
//! Same map and eviction as the direct store, plus a probabilistic filter
//! in front of it: when the filter reports "definitely absent" the map is
//! never touched. The filter cannot delete, so `remove` and size eviction
//! leave stale filter bits behind; the authoritative map check masks the
//! resulting false positives, and the rate only resets on `clear`.

use super::{evict_entries, BloomFilter, DedupKey, UniquenessStore};
use crate::clock::{Clock, EpochMillis, SystemClock};
use crate::config::UniquenessStoreConfig;
use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};

/// Filter headroom over the size threshold, so the filter stays within its
/// configured false-positive rate while entries accumulate ahead of eviction.
const FILTER_HEADROOM: f64 = 1.2;

pub struct FilteredUniquenessStore<C: Clock = SystemClock> {
    entries: RwLock<AHashMap<DedupKey, EpochMillis>>,
    filter: RwLock<BloomFilter>,
    // Serializes the compound filter-insert + map-insert + evict sequence.
    store_lock: Mutex<()>,
    size_threshold: usize,
    time_threshold_ms: u64,
    bloom_fpp: f64,
    clock: C,
}

impl FilteredUniquenessStore<SystemClock> {
    pub fn new(config: &UniquenessStoreConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> FilteredUniquenessStore<C> {
    pub fn with_clock(config: &UniquenessStoreConfig, clock: C) -> Self {
        FilteredUniquenessStore {
            entries: RwLock::new(AHashMap::new()),
            filter: RwLock::new(Self::build_filter(config.size_threshold, config.bloom_fpp)),
            store_lock: Mutex::new(()),
            size_threshold: config.size_threshold,
            time_threshold_ms: config.time_threshold_ms(),
            bloom_fpp: config.bloom_fpp,
            clock,
        }
    }

    fn build_filter(size_threshold: usize, fpp: f64) -> BloomFilter {
        let expected = (size_threshold as f64 * FILTER_HEADROOM).ceil() as usize;
        BloomFilter::new(expected, fpp)
    }
}

impl<C: Clock> UniquenessStore for FilteredUniquenessStore<C> {
    fn exists(&self, key: &DedupKey) -> bool {
        // Fast path: the filter has no false negatives, so "definitely
        // absent" needs no map lookup.
        if !self.filter.read().may_contain(&key.filter_bytes()) {
            return false;
        }

        // "Maybe present" falls through to the authoritative map, which
        // resolves filter false positives.
        self.entries.read().contains_key(key)
    }

    fn store(&self, key: DedupKey) {
        let _guard = self.store_lock.lock();
        let now = self.clock.now();

        self.filter.write().insert(&key.filter_bytes());
        self.entries.write().insert(key, now);
        evict_entries(
            &self.entries,
            now,
            self.time_threshold_ms,
            self.size_threshold,
        );
    }

    fn remove(&self, key: &DedupKey) {
        // Map only: the filter may keep reporting "maybe present" for this
        // key until the next clear(). The map fallback in exists() covers it.
        self.entries.write().remove(key);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) {
        let _guard = self.store_lock.lock();
        self.entries.write().clear();
        *self.filter.write() = Self::build_filter(self.size_threshold, self.bloom_fpp);
    }
}
