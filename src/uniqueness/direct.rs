//! Direct-map uniqueness store
//!
//! Backed by a single concurrent key -> insertion-timestamp map. Reads take
//! the map's read lock only; the compound insert+evict in `store` holds a
//! dedicated mutex so concurrent stores see "insert, time-evict, size-evict"
//! as one step.

use super::{evict_entries, DedupKey, UniquenessStore};
use crate::clock::{Clock, EpochMillis, SystemClock};
use crate::config::UniquenessStoreConfig;
use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};

pub struct DirectUniquenessStore<C: Clock = SystemClock> {
    entries: RwLock<AHashMap<DedupKey, EpochMillis>>,
    // Serializes the compound insert+evict sequence across store() calls.
    store_lock: Mutex<()>,
    size_threshold: usize,
    time_threshold_ms: u64,
    clock: C,
}

impl DirectUniquenessStore<SystemClock> {
    pub fn new(config: &UniquenessStoreConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> DirectUniquenessStore<C> {
    pub fn with_clock(config: &UniquenessStoreConfig, clock: C) -> Self {
        DirectUniquenessStore {
            entries: RwLock::new(AHashMap::new()),
            store_lock: Mutex::new(()),
            size_threshold: config.size_threshold,
            time_threshold_ms: config.time_threshold_ms(),
            clock,
        }
    }
}

impl<C: Clock> UniquenessStore for DirectUniquenessStore<C> {
    fn exists(&self, key: &DedupKey) -> bool {
        self.entries.read().contains_key(key)
    }

    fn store(&self, key: DedupKey) {
        let _guard = self.store_lock.lock();
        let now = self.clock.now();
        self.entries.write().insert(key, now);
        evict_entries(
            &self.entries,
            now,
            self.time_threshold_ms,
            self.size_threshold,
        );
    }

    fn remove(&self, key: &DedupKey) {
        self.entries.write().remove(key);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}
