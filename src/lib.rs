pub mod clock;
pub mod config;
pub mod histogram;
pub mod observability;
pub mod record;
pub mod uniqueness;
pub mod verify;

pub use clock::{Clock, EpochMillis, ManualClock, SystemClock};
pub use config::{CheckpointConfig, UniquenessStoreConfig};
pub use record::{Headers, Record};
pub use uniqueness::{DedupKey, DirectUniquenessStore, FilteredUniquenessStore, UniquenessStore};
pub use verify::{
    Checkpoint, OffsetOrderVerifier, SenderWatermarkVerifier, UniquenessVerifier,
    VerificationResult, Verifier, WatermarkKey,
};
