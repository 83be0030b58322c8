//! Random Delay Policy.
//!
//! Models a memory system that usually answers immediately and occasionally stalls.
//! Each delay is drawn in two stages: with probability `zero_probability` it is zero,
//! otherwise it is uniform over `0..=max_extra`. The generator is owned by the policy and
//! seeded explicitly, so a run is reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use super::DelayPolicy;
use crate::common::constants::DEFAULT_ZERO_DELAY_PROBABILITY;

/// Random Policy state.
#[derive(Clone, Debug)]
pub struct RandomDelay {
    rng: Xoshiro256StarStar,
    zero_probability: f64,
    max_extra: u32,
}

impl RandomDelay {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `seed` - Generator seed.
    /// * `zero_probability` - Chance that a delay is zero; clamped to `[0, 1]`, NaN falls back
    ///   to the default.
    /// * `max_extra` - Upper bound, inclusive, of the uniform stage.
    pub fn new(seed: u64, zero_probability: f64, max_extra: u32) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            zero_probability: if zero_probability.is_nan() {
                DEFAULT_ZERO_DELAY_PROBABILITY
            } else {
                zero_probability.clamp(0.0, 1.0)
            },
            max_extra,
        }
    }
}

impl DelayPolicy for RandomDelay {
    fn next_delay(&mut self) -> u32 {
        if self.rng.gen_bool(self.zero_probability) {
            0
        } else {
            self.rng.gen_range(0..=self.max_extra)
        }
    }
}
