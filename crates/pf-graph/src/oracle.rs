//! Shortest-path oracle trait, Dijkstra implementation, and a source cache.
//!
//! # Pluggability
//!
//! The planner asks "how far, along corridors, is `target` from `source`?"
//! many times per call, through the [`ShortestPathOracle`] trait.  Any
//! exact single-source algorithm works because every edge weight is a
//! non-negative haversine length.
//!
//! # Cost units
//!
//! Metres, as `f64`.  An unreachable target costs `f64::INFINITY`.
//!
//! # Caching
//!
//! One planning call queries the distance from many frontier vertices, and
//! consecutive calls start a hop or two apart, so the same sources recur
//! constantly.  [`CachedOracle`] keeps the full distance vector of the most
//! recently used sources and answers repeats with a lookup.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;

use pf_core::VertexId;

use crate::{PoiGraph, TotalF64};

// ── Oracle trait ──────────────────────────────────────────────────────────────

/// Answers minimal cumulative corridor distance between two vertices.
///
/// Implementations must be `Send + Sync` so one oracle can be shared by the
/// planners of several simulated agents.
pub trait ShortestPathOracle: Send + Sync {
    /// Shortest distance in metres from `source` to `target`.
    ///
    /// `execute(v, v) == 0.0`; unreachable pairs return `f64::INFINITY`.
    fn execute(&self, source: VertexId, target: VertexId) -> f64;

    /// Shortest distance from `source` to every vertex, indexed by
    /// `VertexId`.
    fn distances_from(&self, source: VertexId) -> Arc<[f64]>;
}

// ── DijkstraOracle ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR graph, using `edge_length_m` as cost.
pub struct DijkstraOracle {
    graph: Arc<PoiGraph>,
}

impl DijkstraOracle {
    pub fn new(graph: Arc<PoiGraph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &PoiGraph {
        &self.graph
    }

    /// Run Dijkstra from `source`.  Stops as soon as `stop_at` is settled, if
    /// given; otherwise settles the whole reachable component.
    fn run(&self, source: VertexId, stop_at: Option<VertexId>) -> Vec<f64> {
        let graph = &*self.graph;
        let mut dist = vec![f64::INFINITY; graph.vertex_count()];
        dist[source.index()] = 0.0;

        // Reverse turns the max-heap into a min-heap; VertexId breaks ties.
        let mut heap: BinaryHeap<Reverse<(TotalF64, VertexId)>> = BinaryHeap::new();
        heap.push(Reverse((TotalF64(0.0), source)));

        while let Some(Reverse((TotalF64(cost), v))) = heap.pop() {
            if Some(v) == stop_at {
                break;
            }
            // Skip stale heap entries.
            if cost > dist[v.index()] {
                continue;
            }
            for edge in graph.out_edges(v) {
                let next = graph.edge_to[edge.index()];
                let new_cost = cost + graph.edge_length_m[edge.index()];
                if new_cost < dist[next.index()] {
                    dist[next.index()] = new_cost;
                    heap.push(Reverse((TotalF64(new_cost), next)));
                }
            }
        }
        dist
    }
}

impl ShortestPathOracle for DijkstraOracle {
    fn execute(&self, source: VertexId, target: VertexId) -> f64 {
        if source == target {
            return 0.0;
        }
        self.run(source, Some(target))[target.index()]
    }

    fn distances_from(&self, source: VertexId) -> Arc<[f64]> {
        self.run(source, None).into()
    }
}

// ── CachedOracle ──────────────────────────────────────────────────────────────

/// Least-recently-used cache of whole shortest-path trees, keyed by source.
///
/// The cache sits behind a `Mutex` so the oracle stays `Sync` and shareable;
/// within one planner all access is sequential and the lock is uncontended.
pub struct CachedOracle<O: ShortestPathOracle> {
    inner:    O,
    capacity: usize,
    cache:    Mutex<TreeCache>,
    hits:     AtomicU64,
    misses:   AtomicU64,
}

#[derive(Default)]
struct TreeCache {
    trees:   FxHashMap<VertexId, Arc<[f64]>>,
    /// Least recently used at the front.
    recency: VecDeque<VertexId>,
}

impl TreeCache {
    fn get(&mut self, source: VertexId) -> Option<Arc<[f64]>> {
        let tree = self.trees.get(&source).cloned()?;
        if let Some(pos) = self.recency.iter().position(|&s| s == source) {
            self.recency.remove(pos);
        }
        self.recency.push_back(source);
        Some(tree)
    }

    fn insert(&mut self, source: VertexId, tree: Arc<[f64]>, capacity: usize) {
        if self.trees.insert(source, tree).is_some() {
            // Another caller raced us to the same source; recency already set.
            return;
        }
        self.recency.push_back(source);
        while self.recency.len() > capacity {
            if let Some(evicted) = self.recency.pop_front() {
                self.trees.remove(&evicted);
            }
        }
    }
}

impl<O: ShortestPathOracle> CachedOracle<O> {
    /// Cache at most `capacity` source trees (at least one is always kept).
    pub fn new(inner: O, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            cache:    Mutex::new(TreeCache::default()),
            hits:     AtomicU64::new(0),
            misses:   AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Queries answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Queries that had to run the inner oracle.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of source trees currently held.
    pub fn cached_sources(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).trees.len()
    }

    fn tree(&self, source: VertexId) -> Arc<[f64]> {
        if let Some(tree) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return tree;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // Computed outside the lock so other planners are not blocked.
        let tree = self.inner.distances_from(source);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source, Arc::clone(&tree), self.capacity);
        tree
    }
}

impl<O: ShortestPathOracle> ShortestPathOracle for CachedOracle<O> {
    fn execute(&self, source: VertexId, target: VertexId) -> f64 {
        if source == target {
            return 0.0;
        }
        self.tree(source)[target.index()]
    }

    fn distances_from(&self, source: VertexId) -> Arc<[f64]> {
        self.tree(source)
    }
}
