//! Verification Pipeline Integration Tests
//!
//! Exercises the full checkpoint with all three verifiers composed,
//! verifying:
//! - offset monotonicity per partition
//! - watermark monotonicity per sender
//! - duplicate rejection per (sender, message-id)
//! - short-circuit ordering across verifiers
//! - store-strategy interchangeability
//! - concurrent verify/store from multiple threads

use record_checkpoint::record::header_names;
use record_checkpoint::{
    Checkpoint, DirectUniquenessStore, FilteredUniquenessStore, ManualClock, OffsetOrderVerifier,
    Record, SenderWatermarkVerifier, UniquenessStore, UniquenessStoreConfig, UniquenessVerifier,
    VerificationResult, Verifier,
};
use std::sync::Arc;
use uuid::Uuid;

struct Pipeline {
    checkpoint: Checkpoint,
    offsets: Arc<OffsetOrderVerifier>,
    watermarks: Arc<SenderWatermarkVerifier>,
    store: Arc<dyn UniquenessStore>,
}

fn pipeline_with_store(store: Arc<dyn UniquenessStore>) -> Pipeline {
    let offsets = Arc::new(OffsetOrderVerifier::new());
    let watermarks = Arc::new(SenderWatermarkVerifier::new());
    let uniqueness = Arc::new(UniquenessVerifier::new(store.clone()));

    let verifiers: Vec<Arc<dyn Verifier>> =
        vec![offsets.clone(), watermarks.clone(), uniqueness];
    Pipeline {
        checkpoint: Checkpoint::new(verifiers),
        offsets,
        watermarks,
        store,
    }
}

fn pipeline() -> Pipeline {
    pipeline_with_store(Arc::new(DirectUniquenessStore::new(
        &UniquenessStoreConfig::test(),
    )))
}

fn record(topic: &str, partition: i32, offset: i64, sender: &str, ts: i64, id: Uuid) -> Record {
    Record::new(topic, partition, offset)
        .with_header(header_names::SENDER, sender.as_bytes().to_vec())
        .with_header(header_names::SENDER_TIMESTAMP, ts.to_string().into_bytes())
        .with_header(header_names::MESSAGE_ID, id.to_string().into_bytes())
}

/// verify, and store only on acceptance - the caller contract
fn admit(pipeline: &Pipeline, record: &Record) -> VerificationResult {
    let result = pipeline.checkpoint.verify(record);
    if result.is_accepted() {
        pipeline.checkpoint.store_record(record);
    }
    result
}

// ============================================================================
// Offset ordering
// ============================================================================

#[test]
fn test_sequential_offsets_accepted() {
    let p = pipeline();

    for offset in [0, 1] {
        let r = record("t", 0, offset, "sender-1", 1000 + offset, Uuid::new_v4());
        assert_eq!(admit(&p, &r), VerificationResult::Accepted);
    }

    assert_eq!(p.offsets.latest_offset("t", 0), Some(1));
}

#[test]
fn test_replayed_offset_rejected_state_unchanged() {
    let p = pipeline();
    let r = record("t", 0, 0, "sender-1", 1000, Uuid::new_v4());
    assert_eq!(admit(&p, &r), VerificationResult::Accepted);

    // Same offset, fresh message id and a newer timestamp: only the offset
    // check fires.
    let replay = record("t", 0, 0, "sender-1", 2000, Uuid::new_v4());
    assert_eq!(admit(&p, &replay), VerificationResult::RejectedLateArrival);

    assert_eq!(p.offsets.latest_offset("t", 0), Some(0));
    assert_eq!(
        p.watermarks.watermark("sender-1", "t", 0),
        Some(1000),
        "Rejected record must not advance the watermark"
    );
}

// ============================================================================
// Watermark ordering
// ============================================================================

#[test]
fn test_watermark_advances_then_rejects_late_arrival() {
    let p = pipeline();

    assert_eq!(
        admit(&p, &record("t", 0, 0, "sender-1", 1000, Uuid::new_v4())),
        VerificationResult::Accepted
    );
    assert_eq!(
        admit(&p, &record("t", 0, 1, "sender-1", 2000, Uuid::new_v4())),
        VerificationResult::Accepted
    );
    assert_eq!(p.watermarks.watermark("sender-1", "t", 0), Some(2000));

    assert_eq!(
        admit(&p, &record("t", 0, 2, "sender-1", 500, Uuid::new_v4())),
        VerificationResult::RejectedLateArrival
    );
    assert_eq!(
        p.watermarks.watermark("sender-1", "t", 0),
        Some(2000),
        "Watermark unchanged after rejection"
    );
}

#[test]
fn test_senders_tracked_independently() {
    let p = pipeline();

    assert_eq!(
        admit(&p, &record("t", 0, 0, "sender-1", 1000, Uuid::new_v4())),
        VerificationResult::Accepted
    );
    // Lower timestamp from a different sender on the same partition
    assert_eq!(
        admit(&p, &record("t", 0, 1, "sender-2", 500, Uuid::new_v4())),
        VerificationResult::Accepted
    );

    assert_eq!(p.watermarks.watermark("sender-1", "t", 0), Some(1000));
    assert_eq!(p.watermarks.watermark("sender-2", "t", 0), Some(500));
}

// ============================================================================
// Uniqueness
// ============================================================================

#[test]
fn test_duplicate_rejected_other_sender_accepted() {
    let p = pipeline();
    let id = Uuid::new_v4();

    assert_eq!(
        admit(&p, &record("t", 0, 0, "A", 1000, id)),
        VerificationResult::Accepted
    );
    // Same (sender, message-id), fresh offset and timestamp
    assert_eq!(
        admit(&p, &record("t", 0, 1, "A", 2000, id)),
        VerificationResult::RejectedDuplicate
    );
    // Same message-id from a different sender is unique
    assert_eq!(
        admit(&p, &record("t", 0, 1, "B", 1000, id)),
        VerificationResult::Accepted
    );
}

#[test]
fn test_duplicate_wins_over_late_arrival() {
    let p = pipeline();
    let id = Uuid::new_v4();
    assert_eq!(
        admit(&p, &record("t", 0, 5, "A", 1000, id)),
        VerificationResult::Accepted
    );

    // Record is both a duplicate and behind the offset watermark; the
    // uniqueness verifier runs first, so the duplicate reason wins.
    assert_eq!(
        admit(&p, &record("t", 0, 5, "A", 500, id)),
        VerificationResult::RejectedDuplicate
    );
}

#[test]
fn test_headerless_record_passes_all_verifiers() {
    let p = pipeline();
    let bare = Record::new("t", 0, 0);

    assert_eq!(admit(&p, &bare), VerificationResult::Accepted);
    assert_eq!(p.store.len(), 0, "Nothing stored without dedup headers");
    assert!(p.watermarks.all_watermarks().is_empty());
    // The offset table still advances - offsets need no headers
    assert_eq!(p.offsets.latest_offset("t", 0), Some(0));
}

// ============================================================================
// Store-strategy interchangeability
// ============================================================================

#[test]
fn test_filtered_store_behaves_like_direct_store() {
    for store in [
        Arc::new(DirectUniquenessStore::new(&UniquenessStoreConfig::test()))
            as Arc<dyn UniquenessStore>,
        Arc::new(FilteredUniquenessStore::new(&UniquenessStoreConfig::test()))
            as Arc<dyn UniquenessStore>,
    ] {
        let p = pipeline_with_store(store);
        let id = Uuid::new_v4();

        assert_eq!(
            admit(&p, &record("t", 0, 0, "A", 1000, id)),
            VerificationResult::Accepted
        );
        assert_eq!(
            admit(&p, &record("t", 0, 1, "A", 2000, id)),
            VerificationResult::RejectedDuplicate
        );
        assert_eq!(p.store.len(), 1);

        p.store.clear();
        assert_eq!(p.store.len(), 0);
    }
}

// ============================================================================
// Eviction under the pipeline
// ============================================================================

#[test]
fn test_evicted_duplicate_is_accepted_again() {
    let clock = ManualClock::new(1_000_000);
    let config = UniquenessStoreConfig {
        time_threshold: std::time::Duration::from_millis(100),
        ..UniquenessStoreConfig::test()
    };
    let store: Arc<dyn UniquenessStore> = Arc::new(FilteredUniquenessStore::with_clock(
        &config,
        clock.clone(),
    ));
    let p = pipeline_with_store(store);

    let id = Uuid::new_v4();
    assert_eq!(
        admit(&p, &record("t", 0, 0, "A", 1000, id)),
        VerificationResult::Accepted
    );

    clock.advance_ms(150);
    // Another store call triggers the eviction pass
    p.store
        .store(record_checkpoint::DedupKey::new("B", Uuid::new_v4()));

    // The original pair has aged out, so the "duplicate" is admitted again
    assert_eq!(
        admit(&p, &record("t", 0, 1, "A", 2000, id)),
        VerificationResult::Accepted
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_partition_workers() {
    let store: Arc<dyn UniquenessStore> = Arc::new(FilteredUniquenessStore::new(
        &UniquenessStoreConfig {
            size_threshold: 10_000,
            ..UniquenessStoreConfig::default()
        },
    ));
    let p = pipeline_with_store(store);
    let workers = 8;
    let records_per_worker = 200i64;

    // One worker per partition, each feeding strictly increasing offsets
    // and timestamps for its own sender.
    crossbeam::scope(|scope| {
        for partition in 0..workers {
            let p = &p;
            scope.spawn(move |_| {
                let sender = format!("sender-{}", partition);
                for offset in 0..records_per_worker {
                    let r = record(
                        "t",
                        partition,
                        offset,
                        &sender,
                        1000 + offset,
                        Uuid::new_v4(),
                    );
                    assert_eq!(
                        admit(p, &r),
                        VerificationResult::Accepted,
                        "In-order record must be accepted under concurrency"
                    );
                }
            });
        }
    })
    .expect("workers should not panic");

    for partition in 0..workers {
        assert_eq!(
            p.offsets.latest_offset("t", partition),
            Some(records_per_worker - 1)
        );
        let sender = format!("sender-{}", partition);
        assert_eq!(
            p.watermarks.watermark(&sender, "t", partition),
            Some(1000 + records_per_worker - 1)
        );
    }
    assert_eq!(
        p.store.len(),
        (workers as usize) * (records_per_worker as usize)
    );
}

#[test]
fn test_concurrent_duplicates_admitted_at_most_once() {
    let store: Arc<dyn UniquenessStore> =
        Arc::new(DirectUniquenessStore::new(&UniquenessStoreConfig::default()));
    let p = pipeline_with_store(store);

    // Seed a set of already-admitted records, then race replays of them
    // (fresh offsets so only the duplicate check can fire).
    let ids: Vec<Uuid> = (0..50).map(|_| Uuid::new_v4()).collect();
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(
            admit(&p, &record("t", 0, i as i64, "A", 1000, *id)),
            VerificationResult::Accepted
        );
    }

    crossbeam::scope(|scope| {
        for t in 0..4 {
            let p = &p;
            let ids = &ids;
            scope.spawn(move |_| {
                for (i, id) in ids.iter().enumerate() {
                    let r = record("t", 0, 1000 + (t as i64) * 100 + i as i64, "A", 2000, *id);
                    assert_eq!(
                        p.checkpoint.verify(&r),
                        VerificationResult::RejectedDuplicate
                    );
                }
            });
        }
    })
    .expect("threads should not panic");

    assert_eq!(p.store.len(), 50);
}
