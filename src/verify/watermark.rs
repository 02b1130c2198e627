//! Sender watermark verifier
//!
//! Tracks the highest sender-supplied timestamp stored for each
//! (sender, topic, partition) and rejects records whose `sender-timestamp`
//! is strictly behind it. Records without the relevant headers are
//! unverifiable and pass through unchanged (fail-open).

use super::{VerificationResult, Verifier};
use crate::record::{header_names, Record};
use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

pub const WATERMARK_PRIORITY: u32 = 2;

/// Key for one sender's watermark on one partition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatermarkKey {
    pub sender: String,
    pub topic: String,
    pub partition: i32,
}

impl WatermarkKey {
    pub fn new(sender: impl Into<String>, topic: impl Into<String>, partition: i32) -> Self {
        WatermarkKey {
            sender: sender.into(),
            topic: topic.into(),
            partition,
        }
    }
}

impl std::fmt::Display for WatermarkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}-{}", self.sender, self.topic, self.partition)
    }
}

pub struct SenderWatermarkVerifier {
    watermarks: RwLock<AHashMap<WatermarkKey, i64>>,
}

impl Default for SenderWatermarkVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SenderWatermarkVerifier {
    pub fn new() -> Self {
        SenderWatermarkVerifier {
            watermarks: RwLock::new(AHashMap::new()),
        }
    }

    /// Current watermark for one (sender, topic, partition)
    pub fn watermark(&self, sender: &str, topic: &str, partition: i32) -> Option<i64> {
        self.watermarks
            .read()
            .get(&WatermarkKey::new(sender, topic, partition))
            .copied()
    }

    /// Snapshot of the whole watermark table
    pub fn all_watermarks(&self) -> AHashMap<WatermarkKey, i64> {
        self.watermarks.read().clone()
    }

    /// Sender and parsed sender-timestamp, or `None` when the record is
    /// unverifiable (missing header or unparsable timestamp).
    fn sender_timestamp(record: &Record) -> Option<(WatermarkKey, i64)> {
        let sender = record.headers().last_str(header_names::SENDER)?;
        let timestamp: i64 = record
            .headers()
            .last_str(header_names::SENDER_TIMESTAMP)?
            .parse()
            .ok()?;
        Some((
            WatermarkKey::new(sender, record.topic(), record.partition()),
            timestamp,
        ))
    }
}

impl Verifier for SenderWatermarkVerifier {
    fn priority(&self) -> u32 {
        WATERMARK_PRIORITY
    }

    fn verify(&self, record: &Record) -> VerificationResult {
        let Some((key, timestamp)) = Self::sender_timestamp(record) else {
            debug!(
                topic = record.topic(),
                partition = record.partition(),
                "no sender/sender-timestamp headers - allowing"
            );
            return VerificationResult::Accepted;
        };

        let Some(watermark) = self.watermarks.read().get(&key).copied() else {
            // First record for this key; baseline is established on store
            debug!(%key, timestamp, "first record for sender-partition - allowing");
            return VerificationResult::Accepted;
        };

        // Strict less-than: a timestamp equal to the watermark is accepted.
        if timestamp < watermark {
            warn!(
                %key,
                timestamp,
                watermark,
                behind_ms = watermark - timestamp,
                "late arrival"
            );
            VerificationResult::RejectedLateArrival
        } else {
            VerificationResult::Accepted
        }
    }

    fn store_record(&self, record: &Record) {
        let Some((key, timestamp)) = Self::sender_timestamp(record) else {
            return;
        };
        // Unconditional overwrite; the caller has already verified order.
        self.watermarks.write().insert(key, timestamp);
    }
}
