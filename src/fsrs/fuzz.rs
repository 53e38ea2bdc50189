//! Interval fuzz.
//!
//! Spreads intervals of 2.5 days or more inside a band that widens with the
//! interval, so cards learned together do not stay clustered. The PRNG is
//! seeded from the review itself, keeping `review` deterministic.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// (start, end, factor): each band adds `factor * overlap` days of spread.
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
    (2.5, 7.0, 0.15),
    (7.0, 20.0, 0.1),
    (20.0, f64::INFINITY, 0.05),
];

const FUZZ_THRESHOLD: f64 = 2.5;

pub fn fuzz_seed(reviewed_at: DateTime<Utc>, reps: u32, difficulty: f64, stability: f64) -> u64 {
    let millis = reviewed_at.timestamp_millis() as u64;
    let memory = (difficulty * stability).to_bits();
    millis
        ^ u64::from(reps).rotate_left(40)
        ^ memory.rotate_left(17)
}

/// Inclusive bounds of the fuzzed interval in days.
pub fn fuzz_range(interval: f64, elapsed_days: u32, maximum_interval: u32) -> (u32, u32) {
    let delta: f64 = 1.0
        + FUZZ_RANGES
            .iter()
            .map(|&(start, end, factor)| factor * (interval.min(end) - start).max(0.0))
            .sum::<f64>();

    let max_days = f64::from(maximum_interval);
    let interval = interval.min(max_days);
    let mut min_ivl = (interval - delta).round().max(2.0);
    let max_ivl = (interval + delta).round().min(max_days);
    if interval > f64::from(elapsed_days) {
        min_ivl = min_ivl.max(f64::from(elapsed_days) + 1.0);
    }
    let min_ivl = min_ivl.min(max_ivl);
    (min_ivl as u32, max_ivl as u32)
}

/// Fuzzed interval in whole days. Intervals under 2.5 days are only rounded.
pub fn apply_fuzz(interval: f64, elapsed_days: u32, maximum_interval: u32, seed: u64) -> f64 {
    if interval < FUZZ_THRESHOLD {
        return interval.round();
    }
    let (min_ivl, max_ivl) = fuzz_range(interval, elapsed_days, maximum_interval);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let factor: f64 = rng.gen();
    (factor * f64::from(max_ivl - min_ivl + 1) + f64::from(min_ivl)).floor()
}
