//! Unit tests for pf-planner.

use std::collections::HashSet;
use std::sync::Arc;

use pf_core::{GeoPoint, PlannerConfig, VertexId};
use pf_graph::{CachedOracle, DijkstraOracle, PoiGraph, PoiGraphBuilder};

use crate::{PlanObserver, PlannerBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One ten-thousandth of a degree: ≈ 11.12 m on the equator.
const STEP: f64 = 0.0001;

fn at(lat_steps: f64, lon_steps: f64) -> GeoPoint {
    GeoPoint::new(lat_steps * STEP, lon_steps * STEP)
}

fn config(budget: usize, m: usize, k: u32) -> PlannerConfig {
    PlannerConfig {
        block_budget:           budget,
        top_destinations:       m,
        bfs_hops:               k,
        recompute_destinations: false,
        loss_probability:       0.0,
        seed:                   7,
    }
}

/// Five vertices evenly spaced along the equator, joined into a ring:
/// 0-1-2-3-4-0.  Adjacency: 0:[1,4] 1:[0,2] 2:[1,3] 3:[2,4] 4:[3,0].
///
/// Importance: 0:0.1 1:0.3 2:0.8 3:0.9 4:0.2.
fn ring() -> Arc<PoiGraph> {
    let mut b = PoiGraphBuilder::new();
    let importance = [0.1, 0.3, 0.8, 0.9, 0.2];
    let v: Vec<VertexId> = importance
        .iter()
        .enumerate()
        .map(|(i, &imp)| b.add_vertex(at(0.0, i as f64), imp))
        .collect();
    for i in 0..5 {
        b.add_corridor(v[i], v[(i + 1) % 5]);
    }
    Arc::new(b.build().unwrap())
}

/// Start S with two routes to destination D and a spur to destination E.
///
/// ```text
///              A(1,1)
///            /        \
///   E ─── S(0,0)      D(0,2)
/// (0,-5)     \        /
///             B(-1.2,1)
/// ```
///
/// Ids: S=0 A=1 B=2 E=3 D=4.  Importance ranks D, then E.
fn two_routes() -> Arc<PoiGraph> {
    let mut b = PoiGraphBuilder::new();
    let s = b.add_vertex(at(0.0, 0.0), 0.1);
    let a = b.add_vertex(at(1.0, 1.0), 0.2);
    let bb = b.add_vertex(at(-1.2, 1.0), 0.3);
    let e = b.add_vertex(at(0.0, -5.0), 0.8);
    let d = b.add_vertex(at(0.0, 2.0), 0.9);
    b.add_corridor(s, a);
    b.add_corridor(s, bb);
    b.add_corridor(s, e);
    b.add_corridor(a, d);
    b.add_corridor(bb, d);
    Arc::new(b.build().unwrap())
}

/// `w × h` grid of corridors, row-major ids, importance rising with id.
fn grid(w: usize, h: usize) -> Arc<PoiGraph> {
    let mut b = PoiGraphBuilder::new();
    for r in 0..h {
        for c in 0..w {
            b.add_vertex(at(r as f64, c as f64), (r * w + c) as f64 / 100.0);
        }
    }
    for r in 0..h {
        for c in 0..w {
            let v = VertexId((r * w + c) as u32);
            if c + 1 < w {
                b.add_corridor(v, VertexId((r * w + c + 1) as u32));
            }
            if r + 1 < h {
                b.add_corridor(v, VertexId(((r + 1) * w + c) as u32));
            }
        }
    }
    Arc::new(b.build().unwrap())
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Destinations(Vec<VertexId>),
    Skip(VertexId),
    Reassign(VertexId, Option<usize>, usize),
    Accept(VertexId, usize),
    Finished(usize, VertexId),
}

#[derive(Default)]
struct Recorder(Vec<Event>);

impl PlanObserver for Recorder {
    fn on_destinations(&mut self, d: &[VertexId]) { self.0.push(Event::Destinations(d.to_vec())); }
    fn on_skip(&mut self, v: VertexId) { self.0.push(Event::Skip(v)); }
    fn on_reassign(&mut self, v: VertexId, from: Option<usize>, to: usize) {
        self.0.push(Event::Reassign(v, from, to));
    }
    fn on_accept(&mut self, v: VertexId, d: usize) { self.0.push(Event::Accept(v, d)); }
    fn on_destination_finished(&mut self, i: usize, v: VertexId) {
        self.0.push(Event::Finished(i, v));
    }
}

impl Recorder {
    fn finished(&self) -> Vec<(usize, VertexId)> {
        self.0
            .iter()
            .filter_map(|e| match e {
                Event::Finished(i, v) => Some((*i, *v)),
                _ => None,
            })
            .collect()
    }

    fn position(&self, event: &Event) -> Option<usize> {
        self.0.iter().position(|e| e == event)
    }
}

fn ids(raw: &[u32]) -> Vec<VertexId> {
    raw.iter().map(|&i| VertexId(i)).collect()
}

// ── Destination selector ──────────────────────────────────────────────────────

#[cfg(test)]
mod selector_tests {
    use super::*;
    use crate::{select_destinations, DestinationSelector};

    #[test]
    fn ring_top_two_within_two_hops() {
        let g = ring();
        assert_eq!(select_destinations(&g, VertexId(0), 2, 2), ids(&[3, 2]));
    }

    #[test]
    fn hop_limit_bounds_discovery() {
        let g = ring();
        // One hop from 0 reaches only 1 and 4.
        assert_eq!(select_destinations(&g, VertexId(0), 1, 5), ids(&[1, 4, 0]));
    }

    #[test]
    fn zero_hops_is_source_only() {
        let g = ring();
        assert_eq!(select_destinations(&g, VertexId(2), 0, 3), ids(&[2]));
    }

    #[test]
    fn isolated_source_yields_itself() {
        let mut b = PoiGraphBuilder::new();
        let lone = b.add_vertex(at(0.0, 0.0), 0.1);
        let other = b.add_vertex(at(0.0, 1.0), 0.9);
        b.add_directed_edge(other, lone);
        let g = b.build().unwrap();
        assert_eq!(select_destinations(&g, lone, 4, 3), vec![lone]);
    }

    #[test]
    fn equal_importance_keeps_discovery_order() {
        let mut b = PoiGraphBuilder::new();
        let hub = b.add_vertex(at(0.0, 0.0), 0.0);
        let x = b.add_vertex(at(0.0, 1.0), 0.5);
        let y = b.add_vertex(at(1.0, 0.0), 0.5);
        let z = b.add_vertex(at(0.0, -1.0), 0.5);
        b.add_corridor(hub, z);
        b.add_corridor(hub, x);
        b.add_corridor(hub, y);
        let g = b.build().unwrap();
        assert_eq!(select_destinations(&g, hub, 1, 3), vec![z, x, y]);
    }

    #[test]
    fn output_sorted_and_within_hops() {
        let g = grid(5, 5);
        let hops = 2;
        let out = select_destinations(&g, VertexId(12), hops, 4);
        assert!(out.len() <= 4);
        for w in out.windows(2) {
            assert!(g.importance(w[0]) >= g.importance(w[1]));
        }
        // Manhattan distance on the grid is the hop count.
        for v in &out {
            let (r, c) = (v.0 / 5, v.0 % 5);
            assert!(r.abs_diff(2) + c.abs_diff(2) <= hops);
        }
    }

    #[test]
    fn cache_once_ignores_new_source() {
        let g = ring();
        let mut sel = DestinationSelector::new(2, 2, false);
        let first = sel.resolve(&g, VertexId(0)).to_vec();
        let second = sel.resolve(&g, VertexId(3)).to_vec();
        assert_eq!(first, second);
        assert!(!sel.recomputes());
    }

    #[test]
    fn recompute_follows_source() {
        let g = ring();
        let mut sel = DestinationSelector::new(0, 2, true);
        assert_eq!(sel.resolve(&g, VertexId(0)), &ids(&[0])[..]);
        assert_eq!(sel.resolve(&g, VertexId(3)), &ids(&[3])[..]);
        assert_eq!(sel.cached(), Some(&ids(&[3])[..]));
    }
}

// ── Frontier ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod frontier_tests {
    use super::*;
    use crate::frontier::{Frontier, SearchArena, SearchNode};

    fn node(parent: Option<usize>, v: u32, w1: f64, w2: f64) -> SearchNode {
        SearchNode { parent, vertex: VertexId(v), weight1: w1, weight2: w2, dest: Some(0) }
    }

    #[test]
    fn pops_lowest_score_first() {
        let mut arena = SearchArena::new();
        let mut f = Frontier::new();
        for (v, w) in [(0, 3.0), (1, 1.0), (2, 2.0)] {
            let i = arena.push(node(None, v, w, 0.0));
            f.push(&arena, i);
        }
        let order: Vec<u32> = std::iter::from_fn(|| f.pop()).map(|i| arena[i].vertex.0).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn equal_scores_pop_in_insertion_order() {
        let mut arena = SearchArena::new();
        let mut f = Frontier::new();
        for v in [5, 3, 9, 1] {
            let i = arena.push(node(None, v, 1.0, 1.0));
            f.push(&arena, i);
        }
        let order: Vec<u32> = std::iter::from_fn(|| f.pop()).map(|i| arena[i].vertex.0).collect();
        assert_eq!(order, vec![5, 3, 9, 1]);
    }

    #[test]
    fn requeued_node_goes_behind_equal_scores() {
        let mut arena = SearchArena::new();
        let mut f = Frontier::new();
        let a = arena.push(node(None, 0, 1.0, 0.0));
        let b = arena.push(node(None, 1, 1.0, 0.0));
        f.push(&arena, a);
        f.push(&arena, b);
        let first = f.pop().unwrap();
        assert_eq!(first, a);
        f.push(&arena, a);
        assert_eq!(f.pop(), Some(b));
        assert_eq!(f.pop(), Some(a));
        assert!(f.is_empty());
    }

    #[test]
    fn path_to_walks_parents() {
        let mut arena = SearchArena::new();
        let root = arena.push(SearchNode::root(VertexId(4)));
        let mid = arena.push(node(Some(root), 7, 1.0, 0.0));
        let leaf = arena.push(node(Some(mid), 2, 2.0, 0.0));
        assert_eq!(arena.path_to(leaf), ids(&[4, 7, 2]));
        assert_eq!(arena.path_to(root), ids(&[4]));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn infinite_weight_sorts_last() {
        let mut arena = SearchArena::new();
        let mut f = Frontier::new();
        let far = arena.push(node(None, 0, 1.0, f64::INFINITY));
        let near = arena.push(node(None, 1, 50.0, 0.0));
        f.push(&arena, far);
        f.push(&arena, near);
        assert_eq!(f.pop(), Some(near));
        assert_eq!(f.pop(), Some(far));
    }
}

// ── Builder validation ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use pf_core::PfError;
    use pf_graph::PoiRecord;
    use crate::PlanError;

    #[test]
    fn builds_with_defaults() {
        let planner = PlannerBuilder::new(ring(), PlannerConfig::default()).build().unwrap();
        assert!(planner.visited().is_empty());
        assert!(planner.destinations().is_none());
        assert!(planner.last_report().is_none());
    }

    #[test]
    fn zero_destinations_fails_fast() {
        let result = PlannerBuilder::new(ring(), config(3, 0, 2)).build();
        assert!(matches!(result, Err(PlanError::Config(PfError::Config { field: "top_destinations", .. }))));
    }

    #[test]
    fn zero_budget_fails_fast() {
        let result = PlannerBuilder::new(ring(), config(0, 2, 2)).build();
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn from_records_builds_graph() {
        let records = vec![
            PoiRecord { pos: at(0.0, 0.0), importance: 0.1, neighbours: ids(&[1]) },
            PoiRecord { pos: at(0.0, 1.0), importance: 0.9, neighbours: ids(&[0]) },
        ];
        let mut planner = PlannerBuilder::from_records(&records, config(5, 1, 1))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(planner.plan(VertexId(0)).unwrap(), ids(&[1]));
    }

    #[test]
    fn from_records_rejects_dangling_neighbour() {
        let records = vec![PoiRecord { pos: at(0.0, 0.0), importance: 0.1, neighbours: ids(&[3]) }];
        let result = PlannerBuilder::from_records(&records, config(5, 1, 1));
        assert!(matches!(result, Err(PlanError::Graph(_))));
    }

    #[test]
    fn start_out_of_range_is_an_error() {
        let mut planner = PlannerBuilder::new(ring(), config(3, 2, 2)).build().unwrap();
        let err = planner.plan(VertexId(5)).unwrap_err();
        assert!(matches!(err, PlanError::StartOutOfRange { vertex_count: 5, .. }));
    }
}

// ── Concrete scenarios ────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn ring_first_call() {
        let mut planner = PlannerBuilder::new(ring(), config(3, 2, 2)).build().unwrap();
        let mut rec = Recorder::default();
        let out = planner.plan_with(VertexId(0), &mut rec).unwrap();

        assert_eq!(out, ids(&[1, 2, 3]));
        assert_eq!(rec.0[0], Event::Destinations(ids(&[3, 2])));
        // Destination #1 (vertex 2) is reached before destination #0 (vertex 3).
        assert_eq!(rec.finished(), vec![(1, VertexId(2)), (0, VertexId(3))]);

        let report = planner.last_report().unwrap();
        assert_eq!(report.finished, vec![true, true]);
        assert_eq!(report.visits, vec![1, 2]);
        assert_eq!(report.emitted, 3);
        // Vertex 4 is still queued when the budget is met.
        assert_eq!(report.frontier_left, 1);
    }

    #[test]
    fn ring_second_call_reuses_cached_destinations() {
        let mut planner = PlannerBuilder::new(ring(), config(3, 2, 2)).build().unwrap();
        planner.plan(VertexId(0)).unwrap();

        let mut rec = Recorder::default();
        let out = planner.plan_with(VertexId(3), &mut rec).unwrap();

        // Same destination set even though the agent moved.
        assert_eq!(rec.0[0], Event::Destinations(ids(&[3, 2])));
        // 1 and 2 were emitted by the first call; only 4 and 0 remain.
        assert_eq!(out, ids(&[4, 0]));
        assert!(rec.0.contains(&Event::Skip(VertexId(2))));
        assert!(rec.0.contains(&Event::Skip(VertexId(1))));
        assert!(rec.finished().is_empty());

        let report = planner.last_report().unwrap();
        assert_eq!(report.finished, vec![false, false]);
        assert_eq!(report.frontier_left, 0);
    }

    #[test]
    fn reached_destination_is_finished_at_acceptance() {
        let mut planner = PlannerBuilder::new(two_routes(), config(10, 2, 2)).build().unwrap();
        let mut rec = Recorder::default();
        let out = planner.plan_with(VertexId(0), &mut rec).unwrap();

        let (a, b, e, d) = (VertexId(1), VertexId(2), VertexId(3), VertexId(4));
        assert_eq!(rec.0[0], Event::Destinations(vec![d, e]));
        assert_eq!(out, vec![a, d, e, b]);

        // D's flag flips exactly when D is accepted.
        let accept_d = rec.position(&Event::Accept(d, 0)).unwrap();
        assert_eq!(rec.0[accept_d + 1], Event::Finished(0, d));
        assert_eq!(rec.finished(), vec![(0, d), (1, e)]);
    }

    #[test]
    fn frontier_node_on_finished_destination_is_reassigned_before_acceptance() {
        let mut planner = PlannerBuilder::new(two_routes(), config(10, 2, 2)).build().unwrap();
        let mut rec = Recorder::default();
        planner.plan_with(VertexId(0), &mut rec).unwrap();

        let (b, e, d) = (VertexId(2), VertexId(3), VertexId(4));
        let finished_d = rec.position(&Event::Finished(0, d)).unwrap();
        // B was queued towards D; once D is finished it moves to E, the only
        // unfinished destination, and goes back on the frontier.
        let reassign_b = rec.position(&Event::Reassign(b, Some(0), 1)).unwrap();
        assert!(finished_d < reassign_b);

        // B is not accepted in the same round: E (cheaper) is accepted first.
        let accept_e = rec.position(&Event::Accept(e, 1)).unwrap();
        assert!(reassign_b < accept_e);
        let accept_b = rec
            .0
            .iter()
            .position(|ev| matches!(ev, Event::Accept(v, _) if *v == b))
            .unwrap();
        assert!(accept_e < accept_b);
    }
}

// ── Planner properties ────────────────────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;

    fn assert_well_formed(out: &[VertexId], start: VertexId, budget: usize) {
        assert!(out.len() <= budget, "{} > {budget}", out.len());
        assert!(!out.contains(&start));
        let unique: HashSet<_> = out.iter().collect();
        assert_eq!(unique.len(), out.len(), "duplicates in {out:?}");
    }

    #[test]
    fn budget_respected_and_no_duplicates() {
        let g = grid(6, 6);
        for budget in [1, 4, 9] {
            let mut planner = PlannerBuilder::new(g.clone(), config(budget, 3, 2)).build().unwrap();
            let out = planner.plan(VertexId(14)).unwrap();
            assert_eq!(out.len(), budget);
            assert_well_formed(&out, VertexId(14), budget);
        }
    }

    #[test]
    fn exhausted_destinations_still_terminate() {
        // Budget far beyond the graph: every destination gets finished and
        // the random reassignment phase runs until the frontier empties.
        let g = grid(4, 4);
        let mut planner = PlannerBuilder::new(g, config(100, 2, 1)).build().unwrap();
        let out = planner.plan(VertexId(0)).unwrap();
        assert_eq!(out.len(), 15);
        assert_well_formed(&out, VertexId(0), 100);
        let report = planner.last_report().unwrap();
        assert!(report.finished.iter().all(|&f| f));
        assert_eq!(report.frontier_left, 0);
    }

    #[test]
    fn never_re_emits_across_calls() {
        let g = grid(4, 4);
        let mut planner = PlannerBuilder::new(g, config(5, 2, 2)).build().unwrap();
        let mut emitted = HashSet::new();
        for start in [0, 5, 10, 15, 3] {
            let out = planner.plan(VertexId(start)).unwrap();
            assert_well_formed(&out, VertexId(start), 5);
            for v in out {
                assert!(emitted.insert(v), "{v} emitted twice");
            }
        }
        assert_eq!(planner.visited().len(), emitted.len());
    }

    #[test]
    fn previous_start_can_be_emitted_later() {
        let g = grid(4, 4);
        let mut planner = PlannerBuilder::new(g, config(100, 2, 1)).build().unwrap();
        planner.plan(VertexId(0)).unwrap();
        // Only the first start vertex is left.
        assert_eq!(planner.plan(VertexId(5)).unwrap(), ids(&[0]));
        assert!(planner.plan(VertexId(9)).unwrap().is_empty());
    }

    #[test]
    fn unreachable_region_shortens_result() {
        let mut b = PoiGraphBuilder::new();
        let s = b.add_vertex(at(0.0, 0.0), 0.5);
        let t = b.add_vertex(at(0.0, 1.0), 0.4);
        let island = b.add_vertex(at(5.0, 5.0), 0.9);
        b.add_corridor(s, t);
        let _ = island;
        let mut planner = PlannerBuilder::new(Arc::new(b.build().unwrap()), config(5, 3, 3))
            .build()
            .unwrap();
        assert_eq!(planner.plan(s).unwrap(), vec![t]);
    }

    #[test]
    fn same_seed_same_output() {
        let g = grid(5, 5);
        let run = |seed: u64| {
            let cfg = PlannerConfig { seed, ..config(30, 2, 1) };
            let mut planner = PlannerBuilder::new(g.clone(), cfg).build().unwrap();
            [12u32, 0, 24]
                .iter()
                .map(|&s| planner.plan(VertexId(s)).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn recompute_mode_tracks_the_agent() {
        let g = ring();
        let cfg = PlannerConfig { recompute_destinations: true, ..config(1, 1, 0) };
        let mut planner = PlannerBuilder::new(g, cfg).build().unwrap();
        planner.plan(VertexId(0)).unwrap();
        assert_eq!(planner.destinations(), Some(&ids(&[0])[..]));
        planner.plan(VertexId(3)).unwrap();
        assert_eq!(planner.destinations(), Some(&ids(&[3])[..]));
    }
}

// ── Sharing and the strategy surface ──────────────────────────────────────────

#[cfg(test)]
mod sharing_tests {
    use super::*;
    use crate::PrefetchStrategy;

    #[test]
    fn planners_share_graph_and_oracle_across_threads() {
        let g = grid(5, 5);
        let oracle = Arc::new(CachedOracle::new(DijkstraOracle::new(g.clone()), 32));

        let outputs: Vec<Vec<VertexId>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..3)
                .map(|_| {
                    let g = g.clone();
                    let oracle = Arc::clone(&oracle);
                    scope.spawn(move || {
                        let mut planner = PlannerBuilder::new(g, config(6, 2, 2))
                            .oracle(oracle)
                            .build()
                            .unwrap();
                        planner.plan(VertexId(12)).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // Identical seeds and inputs: identical plans, independent state.
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[1], outputs[2]);
        assert!(oracle.hits() > 0);
    }

    #[test]
    fn strategy_surface_passes_config_through() {
        let cfg = PlannerConfig { loss_probability: 0.25, ..config(3, 2, 2) };
        let mut planner = PlannerBuilder::new(ring(), cfg).build().unwrap();
        assert_eq!(planner.algorithm_id(), 6);
        assert_eq!(planner.name(), "best-first-destinations");
        assert_eq!(planner.block_budget(), 3);
        assert_eq!(planner.loss_probability(), 0.25);
        assert_eq!(planner.next_blocks(VertexId(0)).unwrap(), ids(&[1, 2, 3]));
    }
}
