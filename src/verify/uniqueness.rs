//! Uniqueness verifier
//!
//! Rejects records whose (sender, message-id) pair is already present in
//! the backing [`UniquenessStore`]. Runs at the highest priority so
//! duplicates are caught before any offset or watermark state is consulted.
//! Records without a usable sender or message-id are unverifiable and pass
//! through (fail-open); their state is never stored.

use super::{VerificationResult, Verifier};
use crate::record::{header_names, Record};
use crate::uniqueness::{DedupKey, UniquenessStore};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const UNIQUENESS_PRIORITY: u32 = 0;

pub struct UniquenessVerifier {
    store: Arc<dyn UniquenessStore>,
}

impl UniquenessVerifier {
    pub fn new(store: Arc<dyn UniquenessStore>) -> Self {
        UniquenessVerifier { store }
    }

    /// The dedup key for a record, or `None` when the record is
    /// unverifiable: missing/blank sender, missing/blank message_id, or a
    /// message_id that is not a valid UUID.
    fn dedup_key(record: &Record) -> Option<DedupKey> {
        let sender = record.headers().last_str(header_names::SENDER)?.trim();
        if sender.is_empty() {
            return None;
        }

        let id_str = record.headers().last_str(header_names::MESSAGE_ID)?.trim();
        if id_str.is_empty() {
            return None;
        }

        match Uuid::parse_str(id_str) {
            Ok(message_id) => Some(DedupKey::new(sender, message_id)),
            Err(_) => {
                debug!(message_id = id_str, "invalid UUID in message_id header - allowing");
                None
            }
        }
    }
}

impl Verifier for UniquenessVerifier {
    fn priority(&self) -> u32 {
        UNIQUENESS_PRIORITY
    }

    fn verify(&self, record: &Record) -> VerificationResult {
        let Some(key) = Self::dedup_key(record) else {
            debug!(
                topic = record.topic(),
                partition = record.partition(),
                "no sender/message_id headers - allowing"
            );
            return VerificationResult::Accepted;
        };

        if self.store.exists(&key) {
            warn!(%key, "duplicate message");
            VerificationResult::RejectedDuplicate
        } else {
            VerificationResult::Accepted
        }
    }

    fn store_record(&self, record: &Record) {
        let Some(key) = Self::dedup_key(record) else {
            return;
        };
        self.store.store(key);
    }
}
