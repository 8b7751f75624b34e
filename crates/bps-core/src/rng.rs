//! Deterministic simulation-level RNG wrapper.
//!
//! # Determinism strategy
//!
//! The engine is single-threaded and every policy draws from the same
//! `SimRng`, seeded once from `SimConfig::seed`.  Given the same seed and the
//! same sequence of external decisions, draws happen in the same order and a
//! run is bit-reproducible.
//!
//! Independent replications each own a separate `SimRng`; nothing is shared
//! across threads.

use rand::rngs::SmallRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};

/// Simulation RNG passed by `&mut` to every policy call.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// Returns `None` if the weights are empty or do not sum to a positive,
    /// finite total.  Negative weights count as zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        if !total.is_finite() {
            return None;
        }
        let dist = WeightedIndex::new(weights.iter().map(|w| w.max(0.0))).ok()?;
        Some(dist.sample(&mut self.0))
    }
}
