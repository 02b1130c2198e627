//! Bloom filter for the fast "definitely not a duplicate" path
//!
//! Classic bit-array filter with double hashing (Kirsch-Mitzenmacher):
//! two base hashes (ahash + FNV) are combined into `k` probe positions.
//! No false negatives; false-positive rate is tunable at construction.
//! Deletion is not supported.

use std::hash::{BuildHasher, Hasher};

// Fixed ahash seeds so probe positions are stable for the filter's lifetime.
const AHASH_SEEDS: (u64, u64, u64, u64) = (
    0x9e37_79b9_7f4a_7c15,
    0xf39c_c060_5ced_c834,
    0x1082_276b_f3a2_7251,
    0x7109_87c8_825a_2176,
);

const LN_2: f64 = std::f64::consts::LN_2;

/// Probabilistic membership filter sized from expected insertions and a
/// target false-positive probability.
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
    hasher: ahash::RandomState,
}

impl BloomFilter {
    /// Create a filter sized for `expected_insertions` items at false-positive
    /// probability `fpp`.
    ///
    /// `expected_insertions` is clamped to at least 1 and `fpp` to (0, 1).
    pub fn new(expected_insertions: usize, fpp: f64) -> Self {
        let n = expected_insertions.max(1) as f64;
        let p = fpp.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON);

        // m = -n ln p / (ln 2)^2, k = m/n ln 2
        let num_bits = ((-n * p.ln()) / (LN_2 * LN_2)).ceil().max(64.0) as u64;
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().max(1.0) as u32;
        let num_words = num_bits.div_ceil(64) as usize;

        BloomFilter {
            bits: vec![0u64; num_words],
            num_bits,
            num_hashes,
            hasher: ahash::RandomState::with_seeds(
                AHASH_SEEDS.0,
                AHASH_SEEDS.1,
                AHASH_SEEDS.2,
                AHASH_SEEDS.3,
            ),
        }
    }

    pub fn insert(&mut self, item: &[u8]) {
        let (h1, h2) = self.base_hashes(item);
        for i in 0..self.num_hashes {
            let bit = self.probe(h1, h2, i);
            self.bits[(bit / 64) as usize] |= 1u64 << (bit % 64);
        }
    }

    /// `false` means the item is definitely absent; `true` means it may be
    /// present (possible false positive).
    pub fn may_contain(&self, item: &[u8]) -> bool {
        let (h1, h2) = self.base_hashes(item);
        (0..self.num_hashes).all(|i| {
            let bit = self.probe(h1, h2, i);
            self.bits[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0
        })
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    fn base_hashes(&self, item: &[u8]) -> (u64, u64) {
        let h1 = self.hasher.hash_one(item);

        let mut fnv = fnv::FnvHasher::default();
        fnv.write(item);
        // Odd stride so the probe sequence covers the bit space.
        let h2 = fnv.finish() | 1;

        (h1, h2)
    }

    fn probe(&self, h1: u64, h2: u64, i: u32) -> u64 {
        h1.wrapping_add(h2.wrapping_mul(u64::from(i))) % self.num_bits
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("num_bits", &self.num_bits)
            .field("num_hashes", &self.num_hashes)
            .finish_non_exhaustive()
    }
}
