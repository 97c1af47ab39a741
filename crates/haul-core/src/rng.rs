//! Seedable RNG wrapper for the route planner.
//!
//! # Determinism strategy
//!
//! A planner run owns exactly one `PlannerRng`.  With a fixed seed the whole
//! sequence of candidate batches (and therefore of applied routes) is
//! reproducible, which is what the planner tests rely on.  Without a seed
//! the RNG is seeded from OS entropy.
//!
//! Only candidate generation draws random numbers, and it always runs on the
//! planning thread.  Parallel scoring is pure.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Planner-level RNG.
pub struct PlannerRng(SmallRng);

impl PlannerRng {
    /// Deterministic RNG from `seed`.
    pub fn new(seed: u64) -> Self {
        PlannerRng(SmallRng::seed_from_u64(seed))
    }

    /// Non-deterministic RNG seeded from the operating system.
    pub fn from_entropy() -> Self {
        PlannerRng(SmallRng::from_entropy())
    }

    /// `new(seed)` when a seed is given, otherwise `from_entropy()`.
    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    /// Uniform index in `0..len`.  `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index() on an empty range");
        self.0.gen_range(0..len)
    }
}
