//! Planner configuration.

use crate::{PfError, PfResult};

/// Construction parameters for one planner instance.
///
/// Typically deserialized by the driving simulator (with the `serde`
/// feature) and handed to `PlannerBuilder`, which calls
/// [`validate`](Self::validate) before anything else is built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Maximum number of blocks returned by one planning call.  Must be > 0.
    pub block_budget: usize,

    /// How many candidate destinations to keep (M).  Must be >= 1.
    pub top_destinations: usize,

    /// BFS radius, in hops, used to discover candidate destinations (K).
    pub bfs_hops: u32,

    /// Recompute the destination set on every call instead of caching the
    /// one found on the first call.
    pub recompute_destinations: bool,

    /// Probability that a prefetched block is lost in transit.  Carried for
    /// the surrounding simulator; the planner itself never reads it.
    pub loss_probability: f32,

    /// Seed for the planner's RNG.
    pub seed: u64,
}

impl PlannerConfig {
    /// Reject parameters the search loop cannot honour.
    pub fn validate(&self) -> PfResult<()> {
        if self.block_budget == 0 {
            return Err(PfError::config("block_budget", "must be greater than zero"));
        }
        if self.top_destinations == 0 {
            return Err(PfError::config("top_destinations", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.loss_probability) {
            return Err(PfError::config(
                "loss_probability",
                format!("{} is outside [0, 1]", self.loss_probability),
            ));
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            block_budget:           10,
            top_destinations:       3,
            bfs_hops:               3,
            recompute_destinations: false,
            loss_probability:       0.0,
            seed:                   42,
        }
    }
}
