//! Histogram bucket binning generators
//!
//! Standalone utility for generating metric histogram bucket boundaries
//! covering 0 to infinity. Shares no data or control path with the
//! verification pipeline.

/// Hybrid buckets: a 0 bucket, linear 10-step buckets up to 1000,
/// exponential buckets above, and a terminal infinity bucket.
///
/// The exponential multiplier is chosen so the last finite bucket lands
/// near 1M. Returns bucket upper bounds in ascending order.
pub fn generate_buckets(target_bucket_count: usize) -> Vec<f64> {
    let mut buckets = vec![0.0];

    let linear_step = 10.0;
    let linear_max = 1000.0;
    let mut bucket = linear_step;
    while bucket <= linear_max {
        buckets.push(bucket);
        bucket += linear_step;
    }

    let remaining = target_bucket_count.saturating_sub(buckets.len());
    if remaining > 1 {
        let multiplier = optimal_multiplier(linear_max, remaining);
        let mut current = linear_max;
        for _ in 0..remaining - 1 {
            current *= multiplier;
            buckets.push(current);
        }
    }

    buckets.push(f64::INFINITY);
    buckets
}

/// Multiplier spreading `remaining` exponential buckets from `start` up to
/// roughly 1M.
fn optimal_multiplier(start: f64, remaining: usize) -> f64 {
    let target_max = 1_000_000.0;
    (target_max / start).powf(1.0 / (remaining as f64 - 1.0))
}

/// Power-of-2 buckets: 0, 1, 2, 4, ... with a terminal infinity bucket
pub fn generate_power_of_two_buckets(target_bucket_count: usize) -> Vec<f64> {
    let mut buckets = vec![0.0];

    let mut current = 1.0;
    for _ in 0..target_bucket_count.saturating_sub(2) {
        buckets.push(current);
        current *= 2.0;
    }

    buckets.push(f64::INFINITY);
    buckets
}

/// Logarithmic buckets over 1..1M
pub fn generate_logarithmic_buckets(target_bucket_count: usize) -> Vec<f64> {
    generate_logarithmic_buckets_in(target_bucket_count, 1.0, 1_000_000.0)
}

/// Logarithmic buckets evenly spread (in log space) over `min_value` to
/// `max_value`, bracketed by a 0 bucket and an infinity bucket.
pub fn generate_logarithmic_buckets_in(
    target_bucket_count: usize,
    min_value: f64,
    max_value: f64,
) -> Vec<f64> {
    let mut buckets = vec![0.0];

    let log_min = min_value.ln();
    let log_max = max_value.ln();

    for i in 1..target_bucket_count.saturating_sub(1) {
        let log_value =
            log_min + (log_max - log_min) * i as f64 / (target_bucket_count as f64 - 2.0);
        buckets.push(log_value.exp());
    }

    buckets.push(f64::INFINITY);
    buckets
}
