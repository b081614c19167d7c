//! Fluent builder for constructing a [`PathPlanner`].

use std::sync::Arc;

use rustc_hash::FxHashSet;

use pf_core::{PlannerConfig, PlannerRng};
use pf_graph::{CachedOracle, DijkstraOracle, PoiGraph, PoiRecord, ShortestPathOracle};

use crate::selector::DestinationSelector;
use crate::{PathPlanner, PlanResult};

/// Shortest-path trees kept by the default oracle.
pub const DEFAULT_CACHED_SOURCES: usize = 64;

/// The oracle used when none is supplied.
pub type DefaultOracle = CachedOracle<DijkstraOracle>;

/// Fluent builder for [`PathPlanner<O>`].
///
/// # Required inputs
///
/// - `Arc<PoiGraph>` — built once, shared by every planner over the building
/// - [`PlannerConfig`] — budget, M, K, refresh policy, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                            |
/// |-----------------|----------------------------------------------------|
/// | `.oracle(o)`    | `CachedOracle<DijkstraOracle>`, 64 cached sources  |
/// | `.rng(r)`       | `PlannerRng::new(config.seed)`                     |
///
/// # Example
///
/// ```rust,ignore
/// let graph = Arc::new(PoiGraph::from_records(&records)?);
/// let oracle = Arc::new(CachedOracle::new(DijkstraOracle::new(graph.clone()), 128));
/// let mut planner = PlannerBuilder::new(graph, config)
///     .oracle(oracle)
///     .build()?;
/// let blocks = planner.plan(start)?;
/// ```
pub struct PlannerBuilder<O: ShortestPathOracle = DefaultOracle> {
    graph:  Arc<PoiGraph>,
    config: PlannerConfig,
    oracle: Arc<O>,
    rng:    Option<PlannerRng>,
}

impl PlannerBuilder<DefaultOracle> {
    /// Create a builder over an already built graph.
    pub fn new(graph: Arc<PoiGraph>, config: PlannerConfig) -> Self {
        let oracle = Arc::new(CachedOracle::new(
            DijkstraOracle::new(Arc::clone(&graph)),
            DEFAULT_CACHED_SOURCES,
        ));
        Self { graph, config, oracle, rng: None }
    }

    /// Build the graph from loader records, then create a builder over it.
    pub fn from_records(records: &[PoiRecord], config: PlannerConfig) -> PlanResult<Self> {
        let graph = PoiGraph::from_records(records)?;
        Ok(Self::new(Arc::new(graph), config))
    }
}

impl<O: ShortestPathOracle> PlannerBuilder<O> {
    /// Use `oracle` for shortest-path queries, typically one shared by the
    /// planners of several agents.
    pub fn oracle<P: ShortestPathOracle>(self, oracle: Arc<P>) -> PlannerBuilder<P> {
        PlannerBuilder { graph: self.graph, config: self.config, oracle, rng: self.rng }
    }

    /// Use `rng` instead of seeding from `config.seed`.
    pub fn rng(mut self, rng: PlannerRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate the configuration and return a ready planner.
    pub fn build(self) -> PlanResult<PathPlanner<O>> {
        self.config.validate()?;

        let rng = self.rng.unwrap_or_else(|| PlannerRng::new(self.config.seed));
        let selector = DestinationSelector::new(
            self.config.bfs_hops,
            self.config.top_destinations,
            self.config.recompute_destinations,
        );

        Ok(PathPlanner {
            config:      self.config,
            graph:       self.graph,
            oracle:      self.oracle,
            rng,
            selector,
            visited:     FxHashSet::default(),
            last_report: None,
        })
    }
}
