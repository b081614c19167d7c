//! The interface a prefetch simulator drives every algorithm through.

use pf_core::VertexId;
use pf_graph::ShortestPathOracle;

use crate::{PathPlanner, PlanResult};

/// A block-prefetching algorithm as seen by the trace-replay driver.
///
/// The driver calls [`next_blocks`](Self::next_blocks) once per simulated
/// step with the agent's current vertex, then scores hits and misses against
/// the agent's next positions.  Budget and loss probability are owned by the
/// strategy so the driver can report them alongside the results.
pub trait PrefetchStrategy {
    /// Short human-readable name for reports.
    fn name(&self) -> &'static str;

    /// Numeric id used by the driver to tag result rows.
    fn algorithm_id(&self) -> u32;

    fn block_budget(&self) -> usize;

    fn loss_probability(&self) -> f32;

    /// Blocks to prefetch while the agent stands at `at`.
    fn next_blocks(&mut self, at: VertexId) -> PlanResult<Vec<VertexId>>;
}

impl<O: ShortestPathOracle> PrefetchStrategy for PathPlanner<O> {
    fn name(&self) -> &'static str {
        "best-first-destinations"
    }

    fn algorithm_id(&self) -> u32 {
        6
    }

    fn block_budget(&self) -> usize {
        self.config.block_budget
    }

    fn loss_probability(&self) -> f32 {
        self.config.loss_probability
    }

    fn next_blocks(&mut self, at: VertexId) -> PlanResult<Vec<VertexId>> {
        self.plan(at)
    }
}
