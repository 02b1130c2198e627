//! Verification pipeline
//!
//! A [`Checkpoint`] composes a fixed set of verifiers, ordered once by
//! ascending priority at construction. `verify` short-circuits on the first
//! rejection; `store_record` advances every verifier's tracking state and is
//! only meaningful after a verify that returned [`VerificationResult::Accepted`]
//! (calling it for a rejected record is legal but advances state as if the
//! record had been accepted).

mod offset;
mod uniqueness;
mod watermark;

pub use offset::OffsetOrderVerifier;
pub use uniqueness::UniquenessVerifier;
pub use watermark::{SenderWatermarkVerifier, WatermarkKey};

use crate::record::Record;
use std::sync::Arc;
use tracing::debug;

/// Three-way verification outcome
///
/// Rejections are normal, expected outcomes propagated as data, never as
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    /// The record passed every check
    Accepted,
    /// The record's ordering value (offset or sender-timestamp) is behind
    /// the tracked watermark for its key
    RejectedLateArrival,
    /// The record's (sender, message-id) pair has already been stored
    RejectedDuplicate,
}

impl VerificationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerificationResult::Accepted)
    }
}

impl std::fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerificationResult::Accepted => "accepted",
            VerificationResult::RejectedLateArrival => "rejected-late-arrival",
            VerificationResult::RejectedDuplicate => "rejected-duplicate",
        };
        f.write_str(s)
    }
}

/// A single correctness check with its own tracking state
///
/// Implementations use interior concurrency-safe state: both methods take
/// `&self` and may be called from any thread.
pub trait Verifier: Send + Sync {
    /// Evaluation order; lower runs earlier. Static for the instance's
    /// lifetime.
    fn priority(&self) -> u32;

    /// Check the record against this verifier's tracked state without
    /// mutating it. Unverifiable input (missing or malformed headers)
    /// resolves to `Accepted`.
    fn verify(&self, record: &Record) -> VerificationResult;

    /// Advance tracked state for an accepted record. A no-op when the
    /// record carries nothing this verifier tracks.
    fn store_record(&self, record: &Record);
}

/// Priority-ordered verifier chain
///
/// The verifier set is fixed at composition time; sorting happens once
/// here, not per call. Stable sort keeps registration order among equal
/// priorities.
pub struct Checkpoint {
    verifiers: Vec<Arc<dyn Verifier>>,
}

impl Checkpoint {
    pub fn new(mut verifiers: Vec<Arc<dyn Verifier>>) -> Self {
        verifiers.sort_by_key(|v| v.priority());
        Checkpoint { verifiers }
    }

    /// Consult verifiers in priority order; the first rejection wins.
    ///
    /// Never advances tracking state.
    pub fn verify(&self, record: &Record) -> VerificationResult {
        for verifier in &self.verifiers {
            let result = verifier.verify(record);
            if !result.is_accepted() {
                debug!(
                    topic = record.topic(),
                    partition = record.partition(),
                    offset = record.offset(),
                    %result,
                    "record rejected"
                );
                return result;
            }
        }
        VerificationResult::Accepted
    }

    /// Advance every verifier's tracking state, in priority order.
    ///
    /// Assumes the caller already confirmed acceptance via `verify`.
    pub fn store_record(&self, record: &Record) {
        for verifier in &self.verifiers {
            verifier.store_record(record);
        }
    }

    pub fn verifier_count(&self) -> usize {
        self.verifiers.len()
    }
}
