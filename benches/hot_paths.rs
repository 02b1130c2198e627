//! Hot path benchmarks: duplicate checks against both store strategies and
//! the full checkpoint verify path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use record_checkpoint::record::header_names;
use record_checkpoint::{
    Checkpoint, DedupKey, DirectUniquenessStore, FilteredUniquenessStore, OffsetOrderVerifier,
    Record, SenderWatermarkVerifier, UniquenessStore, UniquenessStoreConfig, UniquenessVerifier,
    Verifier,
};
use std::sync::Arc;
use uuid::Uuid;

fn bench_store_exists(c: &mut Criterion) {
    let config = UniquenessStoreConfig::default();

    let direct = DirectUniquenessStore::new(&config);
    let filtered = FilteredUniquenessStore::new(&config);
    for _ in 0..5000 {
        let key = DedupKey::new("sender-1", Uuid::new_v4());
        direct.store(key.clone());
        filtered.store(key);
    }
    let absent = DedupKey::new("sender-1", Uuid::new_v4());

    c.bench_function("direct_exists_absent", |b| {
        b.iter(|| black_box(direct.exists(black_box(&absent))))
    });
    // The filtered store should answer this from the Bloom filter alone
    c.bench_function("filtered_exists_absent", |b| {
        b.iter(|| black_box(filtered.exists(black_box(&absent))))
    });
}

fn bench_store_insert(c: &mut Criterion) {
    let config = UniquenessStoreConfig::default();

    c.bench_function("direct_store", |b| {
        let store = DirectUniquenessStore::new(&config);
        b.iter(|| store.store(DedupKey::new("sender-1", Uuid::new_v4())))
    });
    c.bench_function("filtered_store", |b| {
        let store = FilteredUniquenessStore::new(&config);
        b.iter(|| store.store(DedupKey::new("sender-1", Uuid::new_v4())))
    });
}

fn bench_checkpoint_verify(c: &mut Criterion) {
    let config = UniquenessStoreConfig::default();
    let store: Arc<dyn UniquenessStore> = Arc::new(FilteredUniquenessStore::new(&config));
    let verifiers: Vec<Arc<dyn Verifier>> = vec![
        Arc::new(UniquenessVerifier::new(store)),
        Arc::new(OffsetOrderVerifier::new()),
        Arc::new(SenderWatermarkVerifier::new()),
    ];
    let checkpoint = Checkpoint::new(verifiers);

    let record = Record::new("t", 0, 1)
        .with_header(header_names::SENDER, b"sender-1".to_vec())
        .with_header(header_names::SENDER_TIMESTAMP, b"1000".to_vec())
        .with_header(
            header_names::MESSAGE_ID,
            Uuid::new_v4().to_string().into_bytes(),
        );

    c.bench_function("checkpoint_verify_accept", |b| {
        b.iter(|| black_box(checkpoint.verify(black_box(&record))))
    });
}

criterion_group!(
    benches,
    bench_store_exists,
    bench_store_insert,
    bench_checkpoint_verify
);
criterion_main!(benches);
