//! Deterministic planner RNG.
//!
//! The planner consumes randomness in exactly one place: once every
//! destination of a call is finished, each further accepted vertex is
//! given a uniformly random destination.  Seeding that stream explicitly
//! keeps whole trace replays reproducible.
//!
//! When several simulated agents each own a planner, derive their streams
//! from one root with [`PlannerRng::child`] so adding an agent does not
//! perturb the others.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seedable RNG owned by a single planner instance.
///
/// Not `Sync`; each planner holds its own.
pub struct PlannerRng(SmallRng);

impl PlannerRng {
    pub fn new(seed: u64) -> Self {
        PlannerRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream for the agent (or worker) `offset`.
    pub fn child(&mut self, offset: u64) -> PlannerRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        PlannerRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Uniform index in `0..len`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`; callers only draw from non-empty destination
    /// sets.
    #[inline]
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}
