//! Duplicate-detection store
//!
//! A keyed set-with-timestamps over (sender, message-id) pairs with
//! time- and size-bounded eviction. Two interchangeable strategies:
//!
//! - [`DirectUniquenessStore`]: concurrent map only
//! - [`FilteredUniquenessStore`]: Bloom-filter fast path in front of the map
//!
//! Eviction runs inside every `store` call, time-based first, then
//! size-based (oldest first). The compound insert+evict sequence holds a
//! dedicated write lock; reads stay off that lock and may observe transient
//! intermediate states between insert and eviction. Eviction is a cleanup
//! policy, not a correctness boundary.

mod bloom;
mod direct;
mod filtered;

pub use bloom::BloomFilter;
pub use direct::DirectUniquenessStore;
pub use filtered::FilteredUniquenessStore;

use crate::clock::EpochMillis;
use ahash::AHashMap;
use parking_lot::RwLock;
use uuid::Uuid;

/// Composite key for duplicate detection
///
/// Duplicate detection is per sender: the same message ID from different
/// senders is considered unique. The sender is trimmed of surrounding
/// whitespace at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    sender: String,
    message_id: Uuid,
}

impl DedupKey {
    pub fn new(sender: &str, message_id: Uuid) -> Self {
        DedupKey {
            sender: sender.trim().to_string(),
            message_id,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    /// Stable byte encoding for Bloom filter hashing
    pub(crate) fn filter_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.sender.len() + 1 + 16);
        bytes.extend_from_slice(self.sender.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(self.message_id.as_bytes());
        bytes
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.sender, self.message_id)
    }
}

/// Contract shared by both store strategies
///
/// `exists`, `remove`, `len` and `clear` are safe from any thread without
/// external locking. `store` runs the compound insert+evict sequence and
/// serializes against other `store` calls internally.
pub trait UniquenessStore: Send + Sync {
    /// Whether the key is currently stored (duplicate check)
    fn exists(&self, key: &DedupKey) -> bool;

    /// Insert the key with the current timestamp, then evict
    fn store(&self, key: DedupKey);

    /// Remove the key if present
    fn remove(&self, key: &DedupKey);

    /// Number of entries currently stored
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries
    fn clear(&self);
}

/// Shared eviction pass: time-based first, then oldest-first down to the
/// size threshold. Caller must hold the store's write-exclusion lock.
pub(crate) fn evict_entries(
    entries: &RwLock<AHashMap<DedupKey, EpochMillis>>,
    now: EpochMillis,
    time_threshold_ms: u64,
    size_threshold: usize,
) {
    // Entries strictly older than the time threshold go first.
    entries
        .write()
        .retain(|_, inserted| now.age_since(*inserted) <= time_threshold_ms);

    let excess = entries.read().len().saturating_sub(size_threshold);
    if excess == 0 {
        return;
    }

    // Still over the ceiling: drop the oldest entries by insertion timestamp
    // until exactly size_threshold remain.
    let mut by_age: Vec<(EpochMillis, DedupKey)> = entries
        .read()
        .iter()
        .map(|(key, inserted)| (*inserted, key.clone()))
        .collect();
    by_age.sort_by_key(|(inserted, _)| *inserted);

    let mut guard = entries.write();
    for (_, key) in by_age.into_iter().take(excess) {
        guard.remove(&key);
    }

    tracing::debug!(evicted = excess, "size eviction removed oldest entries");
}
