//! Per-partition offset order verifier
//!
//! Tracks the last accepted offset for each (topic, partition) and rejects
//! records whose offset is not strictly greater. The store primitive itself
//! does not enforce monotonicity; enforcement happens at verify time, and
//! callers gate store_record on an accepted verify.

use super::{VerificationResult, Verifier};
use crate::record::Record;
use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

pub const OFFSET_PRIORITY: u32 = 1;

pub struct OffsetOrderVerifier {
    // (topic, partition) -> last stored offset
    offsets: RwLock<AHashMap<(String, i32), i64>>,
}

impl Default for OffsetOrderVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetOrderVerifier {
    pub fn new() -> Self {
        OffsetOrderVerifier {
            offsets: RwLock::new(AHashMap::new()),
        }
    }

    /// Last stored offset for a partition, `None` if nothing recorded yet
    pub fn latest_offset(&self, topic: &str, partition: i32) -> Option<i64> {
        self.offsets
            .read()
            .get(&(topic.to_string(), partition))
            .copied()
    }
}

impl Verifier for OffsetOrderVerifier {
    fn priority(&self) -> u32 {
        OFFSET_PRIORITY
    }

    fn verify(&self, record: &Record) -> VerificationResult {
        let key = (record.topic().to_string(), record.partition());

        let last = match self.offsets.read().get(&key) {
            // First record for this partition is always admitted
            None => {
                debug!(
                    topic = record.topic(),
                    partition = record.partition(),
                    "first record for partition - allowing"
                );
                return VerificationResult::Accepted;
            }
            Some(&last) => last,
        };

        // Offset equal to or below the tracked value is out of order,
        // including exact replays of the last offset.
        if record.offset() > last {
            VerificationResult::Accepted
        } else {
            warn!(
                topic = record.topic(),
                partition = record.partition(),
                offset = record.offset(),
                last_offset = last,
                "out-of-order offset"
            );
            VerificationResult::RejectedLateArrival
        }
    }

    fn store_record(&self, record: &Record) {
        // Unconditional overwrite; the caller has already verified order.
        self.offsets.write().insert(
            (record.topic().to_string(), record.partition()),
            record.offset(),
        );
    }
}
