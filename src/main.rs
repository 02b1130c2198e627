//! Demo feed for the verification pipeline
//!
//! Synthesizes a batch of records with occasional duplicates and late
//! arrivals, runs each through the checkpoint, and prints a summary.

use rand::Rng;
use record_checkpoint::{
    observability, record::header_names, Checkpoint, CheckpointConfig, FilteredUniquenessStore,
    OffsetOrderVerifier, Record, SenderWatermarkVerifier, UniquenessStore, UniquenessVerifier,
    VerificationResult, Verifier,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

const TOPIC: &str = "watermark-topic";
const PARTITIONS: i32 = 3;
const RECORDS: usize = 40;

fn main() {
    observability::init_tracing();

    let config = CheckpointConfig::default().with_env_overrides();
    let store = Arc::new(FilteredUniquenessStore::new(&config.uniqueness));

    let uniqueness = Arc::new(UniquenessVerifier::new(store.clone()));
    let offsets = Arc::new(OffsetOrderVerifier::new());
    let watermarks = Arc::new(SenderWatermarkVerifier::new());

    let verifiers: Vec<Arc<dyn Verifier>> =
        vec![uniqueness.clone(), offsets.clone(), watermarks.clone()];
    let checkpoint = Checkpoint::new(verifiers);

    let mut rng = rand::thread_rng();
    let base_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX_EPOCH")
        .as_millis() as i64;

    let mut next_offset = [0i64; PARTITIONS as usize];
    let mut previous: Option<Record> = None;
    let mut accepted = 0usize;
    let mut late = 0usize;
    let mut duplicates = 0usize;

    for i in 0..RECORDS {
        let record = match &previous {
            // Occasionally replay the previous record verbatim: same
            // message_id, same offset - rejected as a duplicate.
            Some(prev) if rng.gen_bool(0.15) => prev.clone(),
            _ => {
                let partition = rng.gen_range(0..PARTITIONS);
                let sender = if rng.gen_bool(0.5) { "sender-1" } else { "sender-2" };
                // Occasionally rewind the sender timestamp well behind any
                // plausible watermark - rejected as a late arrival.
                let sender_ts = if rng.gen_bool(0.1) {
                    base_ts - 60_000
                } else {
                    base_ts + i as i64 * 10
                };
                let offset = next_offset[partition as usize];
                next_offset[partition as usize] += 1;

                Record::new(TOPIC, partition, offset)
                    .with_value(format!("Watermark message {}", i + 1))
                    .with_timestamp(base_ts + i as i64)
                    .with_header(header_names::SENDER, sender.as_bytes().to_vec())
                    .with_header(
                        header_names::SENDER_TIMESTAMP,
                        sender_ts.to_string().into_bytes(),
                    )
                    .with_header(
                        header_names::MESSAGE_ID,
                        Uuid::new_v4().to_string().into_bytes(),
                    )
            }
        };

        let result = checkpoint.verify(&record);
        info!(
            partition = record.partition(),
            offset = record.offset(),
            %result,
            "record verified"
        );

        match result {
            VerificationResult::Accepted => {
                // Caller-side processing would happen here, then the state
                // advance.
                checkpoint.store_record(&record);
                accepted += 1;
            }
            VerificationResult::RejectedLateArrival => late += 1,
            VerificationResult::RejectedDuplicate => duplicates += 1,
        }

        previous = Some(record);
    }

    println!("=== Checkpoint demo summary ===");
    println!("records:          {}", RECORDS);
    println!("accepted:         {}", accepted);
    println!("late arrivals:    {}", late);
    println!("duplicates:       {}", duplicates);
    println!("dedup store size: {}", store.len());
    for partition in 0..PARTITIONS {
        if let Some(offset) = offsets.latest_offset(TOPIC, partition) {
            println!("latest offset p{}: {}", partition, offset);
        }
    }
    for (key, watermark) in watermarks.all_watermarks() {
        println!("watermark {}: {}", key, watermark);
    }
}
