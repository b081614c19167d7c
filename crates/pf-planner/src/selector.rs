//! Candidate destination discovery.
//!
//! Destinations are the most important POIs within a few hops of the agent:
//! a bounded breadth-first walk collects everything within `hops` of the
//! source (the source included), then the collection is ranked by
//! importance and cut to the top `m`.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::debug;

use pf_core::VertexId;
use pf_graph::PoiGraph;

/// Rank the vertices within `hops` of `source` by importance and keep `m`.
///
/// Discovery follows each vertex's adjacency order.  The sort is stable, so
/// equal importance keeps discovery order.  A source with no neighbours
/// yields just `[source]`.
pub fn select_destinations(
    graph:  &PoiGraph,
    source: VertexId,
    hops:   u32,
    m:      usize,
) -> Vec<VertexId> {
    let mut discovered = vec![source];
    let mut seen: FxHashSet<VertexId> = FxHashSet::default();
    seen.insert(source);

    let mut queue = VecDeque::from([(source, 0u32)]);
    while let Some((v, level)) = queue.pop_front() {
        // Levels leave the queue in order, so the first node at the limit
        // means every shallower node has been expanded.
        if level == hops {
            break;
        }
        for next in graph.neighbours(v) {
            if seen.insert(next) {
                discovered.push(next);
                queue.push_back((next, level + 1));
            }
        }
    }

    discovered.sort_by(|a, b| graph.importance(*b).total_cmp(&graph.importance(*a)));
    discovered.truncate(m);
    discovered
}

/// Holds the destination set between calls and applies the refresh policy.
pub struct DestinationSelector {
    hops:      u32,
    m:         usize,
    recompute: bool,
    cached:    Option<Vec<VertexId>>,
}

impl DestinationSelector {
    pub fn new(hops: u32, m: usize, recompute: bool) -> Self {
        Self { hops, m, recompute, cached: None }
    }

    /// The destination set for a call starting at `source`.
    ///
    /// In cache-once mode the set found on the first call is returned
    /// unchanged forever after, wherever the agent has moved.
    pub fn resolve(&mut self, graph: &PoiGraph, source: VertexId) -> &[VertexId] {
        if self.recompute || self.cached.is_none() {
            let set = select_destinations(graph, source, self.hops, self.m);
            debug!(
                source = source.0,
                hops = self.hops,
                count = set.len(),
                "selected destinations"
            );
            self.cached = Some(set);
        }
        self.cached.as_deref().unwrap_or_default()
    }

    /// The set from the most recent call, if any call has happened.
    pub fn cached(&self) -> Option<&[VertexId]> {
        self.cached.as_deref()
    }

    pub fn recomputes(&self) -> bool {
        self.recompute
    }
}
