// crates/simstream-core/src/runtime/rng.rs
// ============================================================================
// Module: Simstream Seeded Randomness
// Description: The single seeded RNG consumed by every randomized decision
//              in a run (`spec.md` §9).
// Purpose: Guarantee "determinism under seed" (§8 invariant 4) by routing
//          every draw — nullability, selection, item count, per-item
//          generation, delay sampling — through one `ChaCha8Rng` in a
//          fixed order.
// Dependencies: rand, rand_chacha
// ============================================================================

//! ## Overview
//! `rand_chacha::ChaCha8Rng` is used instead of `rand::rngs::StdRng`
//! because its output is part of the documented, versioned contract of the
//! `rand_chacha` crate, whereas `StdRng`'s algorithm is an unspecified
//! implementation detail that may change across `rand` releases. A
//! simulator whose entire value proposition includes reproducible runs
//! under a fixed seed cannot depend on an algorithm the upstream crate is
//! free to swap out.
//!
//! Draw order (must not change without a matching documentation update,
//! per `spec.md` §9): nullability → selection → item count → per-item
//! generation.

use rand::distributions::Alphanumeric;
use rand::distributions::Distribution;
use rand::distributions::Uniform;
use rand::distributions::WeightedIndex;
use rand::RngCore;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The run-wide seeded randomness source.
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Seeds a new RNG deterministically from a user-supplied seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds a new RNG from entropy, for unseeded (non-reproducible) runs.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Draws a boolean that is `true` with probability `probability`,
    /// clamped to `[0, 1]`. Used for `nullable_probability` and
    /// `update_existing_probability`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Draws a uniform `i64` in `[low, high]` inclusive.
    pub fn gen_range_i64(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Draws a uniform `f64` in `[low, high]`.
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Draws a uniform `usize` in `[low, high]` inclusive, used for array
    /// item counts.
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Draws a uniform index in `[0, len)`. Panics only if `len == 0`,
    /// which callers must not invoke this with (selection over an empty
    /// set is a caller-side `InvalidSchema`/`InfeasibleEvent` condition).
    pub fn choose_uniform_index(&mut self, len: usize) -> usize {
        Uniform::new(0, len).sample(&mut self.inner)
    }

    /// Draws an index in `[0, weights.len())` weighted by `weights`.
    ///
    /// # Errors
    ///
    /// Returns an error if `weights` is empty or every weight is zero.
    pub fn choose_weighted_index(&mut self, weights: &[f64]) -> Result<usize, rand::distributions::WeightedError> {
        let dist = WeightedIndex::new(weights)?;
        Ok(dist.sample(&mut self.inner))
    }

    /// Generates a random alphanumeric string of the given length over
    /// `[A-Za-z0-9]`.
    pub fn alphanumeric_string(&mut self, length: usize) -> String {
        (&mut self.inner).sample_iter(Alphanumeric).take(length).map(char::from).collect()
    }

    /// Fills `dest` with random bytes, used by `uuid_v4` so UUID generation
    /// draws from the run's seeded sequence instead of the system RNG.
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    /// Borrows this RNG as a type-erased [`rand::RngCore`], the seam
    /// `simstream-providers`' `FakeProvider` implementations draw from.
    pub fn as_rng_core(&mut self) -> &mut dyn RngCore {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    #[test]
    fn same_seed_yields_identical_draw_sequence() {
        let mut a = SimRng::from_seed(42);
        let mut b = SimRng::from_seed(42);
        for _ in 0..20 {
            assert_eq!(a.gen_range_i64(0, 1000), b.gen_range_i64(0, 1000));
        }
    }

    #[test]
    fn range_is_inclusive_and_respects_bounds() {
        let mut rng = SimRng::from_seed(7);
        for _ in 0..200 {
            let v = rng.gen_range_i64(5, 5);
            assert_eq!(v, 5);
        }
        for _ in 0..200 {
            let v = rng.gen_range_usize(1, 3);
            assert!((1..=3).contains(&v));
        }
    }

    #[test]
    fn alphanumeric_string_has_requested_length_and_charset() {
        let mut rng = SimRng::from_seed(1);
        let s = rng.alphanumeric_string(12);
        assert_eq!(s.len(), 12);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn fill_bytes_is_seed_deterministic() {
        let mut a = SimRng::from_seed(9);
        let mut b = SimRng::from_seed(9);
        let mut buf_a = [0u8; 16];
        let mut buf_b = [0u8; 16];
        a.fill_bytes(&mut buf_a);
        b.fill_bytes(&mut buf_b);
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn weighted_index_respects_zero_weights() {
        let mut rng = SimRng::from_seed(3);
        for _ in 0..50 {
            let idx = rng.choose_weighted_index(&[0.0, 1.0, 0.0]).unwrap();
            assert_eq!(idx, 1);
        }
    }
}
