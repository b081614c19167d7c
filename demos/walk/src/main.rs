//! walk — smallest end-to-end run of the rust_pf prefetch planner.
//!
//! Replays one recorded walk across a synthetic department floor.  At every
//! step the agent's position is snapped to the nearest POI, the planner picks
//! the next blocks to prefetch, and the step counts as a hit when the room the
//! agent walks into next is already in the local block cache.

mod building;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pf_core::{GeoPoint, PlannerConfig, PlannerRng, VertexId};
use pf_graph::{CachedOracle, DijkstraOracle};
use pf_planner::{PlannerBuilder, PrefetchStrategy};

use building::{build_floor, recorded_route};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64   = 42;
const BLOCK_BUDGET:     usize = 3;
const LOSS_PROBABILITY: f32   = 0.1;
/// Recorded positions wander this far (degrees) from the room centre.
const GPS_JITTER:       f64   = 0.000_01;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Building and shared shortest-path oracle.
    let (graph, cafeteria) = build_floor().context("building the floor graph")?;
    let graph = Arc::new(graph);
    let oracle = Arc::new(CachedOracle::new(DijkstraOracle::new(Arc::clone(&graph)), 32));
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        %cafeteria,
        "floor loaded"
    );

    // 2. One planner for our single agent.
    let config = PlannerConfig {
        block_budget:           BLOCK_BUDGET,
        top_destinations:       2,
        bfs_hops:               3,
        recompute_destinations: false,
        loss_probability:       LOSS_PROBABILITY,
        seed:                   SEED,
    };
    let mut root_rng = PlannerRng::new(SEED);
    let mut planner = PlannerBuilder::new(Arc::clone(&graph), config)
        .oracle(Arc::clone(&oracle))
        .rng(root_rng.child(0))
        .build()?;
    let mut network = root_rng.child(1);

    // 3. Replay the recorded walk.
    let route = recorded_route();
    let mut cache: HashSet<VertexId> = HashSet::new();
    let (mut hits, mut misses, mut lost) = (0usize, 0usize, 0usize);

    let t0 = Instant::now();
    for (step, pair) in route.windows(2).enumerate() {
        let (here, next) = (pair[0], pair[1]);

        // Positions arrive as noisy coordinates, not vertex ids.
        let centre = graph.pos(here);
        let sign = if step % 2 == 0 { 1.0 } else { -1.0 };
        let recorded = GeoPoint::new(centre.lat + sign * GPS_JITTER, centre.lon);
        let at = graph
            .snap_to_vertex(recorded)
            .context("snapping a recorded position")?;

        cache.insert(at);
        for block in planner.next_blocks(at)? {
            if network.gen_bool(f64::from(planner.loss_probability())) {
                lost += 1;
            } else {
                cache.insert(block);
            }
        }

        if cache.contains(&next) {
            hits += 1;
        } else {
            misses += 1;
        }
        info!(step, %at, %next, cached = cache.len(), "step");
    }
    let elapsed = t0.elapsed();

    // 4. Summary.
    let steps = hits + misses;
    println!("=== walk — {} (algorithm {}) ===", planner.name(), planner.algorithm_id());
    println!("Steps: {steps}  |  Budget: {}  |  Loss: {:.0}%", planner.block_budget(), LOSS_PROBABILITY * 100.0);
    println!(
        "Hits: {hits}  Misses: {misses}  Hit rate: {:.1}%",
        100.0 * hits as f64 / steps.max(1) as f64
    );
    println!("Blocks lost in transit: {lost}");
    if let Some(destinations) = planner.destinations() {
        let names: Vec<String> = destinations.iter().map(ToString::to_string).collect();
        println!("Destinations: {}", names.join(", "));
    }
    println!(
        "Oracle cache: {} hits, {} misses, {} sources held",
        oracle.hits(),
        oracle.misses(),
        oracle.cached_sources()
    );
    println!("Planning time: {:.3} ms", elapsed.as_secs_f64() * 1_000.0);

    Ok(())
}
