// ============================================================
// Layer 4 — Seeded Shuffle Splitter
// ============================================================
// Shuffles samples with a seeded RNG and cuts them into a
// (kept, held-out) pair.
//
//   held_out = ceil(n * held_out_fraction)
//   kept     = n - held_out
//
// The RNG is rebuilt from the seed on every call, so the same
// input order and seed always give the same partitions. The
// dataset split runs this twice: 80/20, then 50/50 on the 20.
//
// Uses Fisher-Yates via rand::seq::SliceRandom over StdRng.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` and return `(kept, held_out)`.
///
/// `held_out_fraction` is clamped to [0, 1].
pub fn shuffle_split<T>(
    mut samples:       Vec<T>,
    held_out_fraction: f64,
    seed:              u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let fraction = held_out_fraction.clamp(0.0, 1.0);
    let held_out = ((total as f64) * fraction).ceil() as usize;
    let held_out = held_out.min(total);

    // The shuffled prefix is held out, the remainder is kept
    let kept = samples.split_off(held_out);

    tracing::debug!(
        "Shuffle split (seed {}): {} kept, {} held out",
        seed,
        kept.len(),
        samples.len(),
    );

    (kept, samples)
}
