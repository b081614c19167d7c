//! The `PathPlanner` and its per-call search loop.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, enabled, trace, Level};

use pf_core::{GeoPoint, PlannerConfig, PlannerRng, VertexId};
use pf_graph::{PoiGraph, ShortestPathOracle};

use crate::frontier::{Frontier, SearchArena, SearchNode};
use crate::selector::DestinationSelector;
use crate::{NoopObserver, PlanError, PlanObserver, PlanResult};

// ── Per-call destination bookkeeping ──────────────────────────────────────────

/// Completion state of the destination set, rebuilt at the start of every
/// call.
struct CallState {
    destinations: Vec<VertexId>,
    finished:     Vec<bool>,
    /// Accepted vertices per destination.  Reported, never consulted.
    visits:       Vec<u32>,
}

impl CallState {
    fn new(destinations: Vec<VertexId>) -> Self {
        let n = destinations.len();
        Self { destinations, finished: vec![false; n], visits: vec![0; n] }
    }

    fn all_finished(&self) -> bool {
        self.finished.iter().all(|&f| f)
    }

    /// Unfinished destination closest (haversine) to `from`; the first one
    /// wins a tie.  `None` once every destination is finished.
    fn nearest_unfinished(&self, graph: &PoiGraph, from: GeoPoint) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &dest) in self.destinations.iter().enumerate() {
            if self.finished[i] {
                continue;
            }
            let d = graph.pos(dest).distance_m(from);
            if best.is_none_or(|(_, min)| d < min) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Destination a node assigned to `current` should head for, measured
    /// from `at`.
    ///
    /// - every destination finished → a uniformly random one;
    /// - unassigned, or assigned to a finished one → nearest unfinished;
    /// - otherwise → unchanged.
    fn resolve(
        &self,
        rng:     &mut PlannerRng,
        graph:   &PoiGraph,
        current: Option<usize>,
        at:      GeoPoint,
    ) -> usize {
        if self.all_finished() {
            return rng.pick_index(self.destinations.len());
        }
        match current {
            Some(d) if !self.finished[d] => d,
            _ => self.nearest_unfinished(graph, at).unwrap_or_default(),
        }
    }
}

// ── PlanReport ────────────────────────────────────────────────────────────────

/// Summary of the most recent planning call.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanReport {
    pub start:         VertexId,
    pub destinations:  Vec<VertexId>,
    pub finished:      Vec<bool>,
    pub visits:        Vec<u32>,
    pub emitted:       usize,
    /// Nodes still queued when the call stopped (0 if the frontier emptied).
    pub frontier_left: usize,
}

// ── PathPlanner ───────────────────────────────────────────────────────────────

/// Best-first prefetch planner for one mobile agent.
///
/// The graph and oracle are shared read-only; everything else is owned by the
/// instance and mutated on every call, so each simulated agent needs its own
/// planner.
///
/// # Visited-set lifecycle
///
/// Every vertex a call emits is remembered for the lifetime of the instance
/// and never emitted again, while per-destination completion is forgotten at
/// the start of each call.  A destination reached in an earlier call can
/// therefore be targeted again but never re-emitted.  The only way to clear
/// the visited set is to build a new planner.
///
/// Create via [`PlannerBuilder`][crate::PlannerBuilder].
pub struct PathPlanner<O: ShortestPathOracle> {
    pub(crate) config:      PlannerConfig,
    pub(crate) graph:       Arc<PoiGraph>,
    pub(crate) oracle:      Arc<O>,
    pub(crate) rng:         PlannerRng,
    pub(crate) selector:    DestinationSelector,
    pub(crate) visited:     FxHashSet<VertexId>,
    pub(crate) last_report: Option<PlanReport>,
}

impl<O: ShortestPathOracle> PathPlanner<O> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Plan the next batch of blocks to prefetch from `start`.
    ///
    /// Returns at most `block_budget` distinct vertex ids in acceptance
    /// order.  The list is shorter when the reachable, not yet emitted part
    /// of the graph runs out.
    pub fn plan(&mut self, start: VertexId) -> PlanResult<Vec<VertexId>> {
        self.plan_with(start, &mut NoopObserver)
    }

    /// [`plan`](Self::plan), reporting search events to `observer`.
    pub fn plan_with<Obs: PlanObserver>(
        &mut self,
        start:    VertexId,
        observer: &mut Obs,
    ) -> PlanResult<Vec<VertexId>> {
        if !self.graph.contains(start) {
            return Err(PlanError::StartOutOfRange {
                start,
                vertex_count: self.graph.vertex_count(),
            });
        }

        let graph = &*self.graph;
        let budget = self.config.block_budget;

        let destinations = self.selector.resolve(graph, start).to_vec();
        observer.on_destinations(&destinations);
        let mut state = CallState::new(destinations);

        let mut arena = SearchArena::new();
        let mut frontier = Frontier::new();
        let mut seen: FxHashSet<VertexId> = FxHashSet::default();
        let mut result = Vec::with_capacity(budget);

        let root = arena.push(SearchNode::root(start));
        frontier.push(&arena, root);
        seen.insert(start);

        while let Some(idx) = frontier.pop() {
            let vertex = arena[idx].vertex;

            if vertex == start || self.visited.contains(&vertex) {
                observer.on_skip(vertex);
            } else {
                let old = arena[idx].dest;
                let dest = state.resolve(&mut self.rng, graph, old, graph.pos(vertex));

                if old != Some(dest) {
                    let node = &mut arena[idx];
                    node.dest = Some(dest);
                    node.weight2 = self.oracle.execute(vertex, state.destinations[dest]);
                    observer.on_reassign(vertex, old, dest);
                    trace!(vertex = vertex.0, ?old, new = dest, "reassigned destination");

                    // Re-rank under the new weight2 unless there is nothing
                    // left to head for.
                    if !state.all_finished() {
                        frontier.push(&arena, idx);
                        continue;
                    }
                }

                self.visited.insert(vertex);
                result.push(vertex);
                state.visits[dest] += 1;
                observer.on_accept(vertex, dest);
                if enabled!(Level::TRACE) {
                    trace!(vertex = vertex.0, dest, path = ?arena.path_to(idx), "accepted");
                }

                if state.destinations[dest] == vertex && !state.finished[dest] {
                    state.finished[dest] = true;
                    observer.on_destination_finished(dest, vertex);
                }

                if result.len() == budget {
                    break;
                }
            }

            expand(
                graph,
                &*self.oracle,
                &mut self.rng,
                &state,
                &mut arena,
                &mut frontier,
                &mut seen,
                idx,
            );
        }

        debug!(
            start = start.0,
            emitted = result.len(),
            frontier_left = frontier.len(),
            "plan complete"
        );

        self.last_report = Some(PlanReport {
            start,
            destinations:  state.destinations,
            finished:      state.finished,
            visits:        state.visits,
            emitted:       result.len(),
            frontier_left: frontier.len(),
        });

        Ok(result)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<PoiGraph> {
        &self.graph
    }

    pub fn oracle(&self) -> &Arc<O> {
        &self.oracle
    }

    /// Every vertex emitted by this instance so far.
    pub fn visited(&self) -> &FxHashSet<VertexId> {
        &self.visited
    }

    /// The destination set used by the most recent call.
    pub fn destinations(&self) -> Option<&[VertexId]> {
        self.selector.cached()
    }

    pub fn last_report(&self) -> Option<&PlanReport> {
        self.last_report.as_ref()
    }
}

// ── Expansion ─────────────────────────────────────────────────────────────────

/// Queue every neighbour of `arena[idx]` not yet seen this call.
#[allow(clippy::too_many_arguments)]
fn expand<O: ShortestPathOracle>(
    graph:    &PoiGraph,
    oracle:   &O,
    rng:      &mut PlannerRng,
    state:    &CallState,
    arena:    &mut SearchArena,
    frontier: &mut Frontier,
    seen:     &mut FxHashSet<VertexId>,
    idx:      usize,
) {
    let SearchNode { vertex, weight1, dest: parent_dest, .. } = arena[idx];
    let here = graph.pos(vertex);

    for next in graph.neighbours(vertex) {
        if !seen.insert(next) {
            continue;
        }
        let there = graph.pos(next);

        // The root's children pick the destination nearest themselves;
        // everyone else inherits, re-checked from the parent's position.
        let at = if parent_dest.is_none() { there } else { here };
        let dest = state.resolve(rng, graph, parent_dest, at);

        let child = arena.push(SearchNode {
            parent:  Some(idx),
            vertex:  next,
            weight1: weight1 + there.distance_m(here),
            weight2: oracle.execute(next, state.destinations[dest]),
            dest:    Some(dest),
        });
        frontier.push(arena, child);
    }
}
