//! Synthetic single-floor building.
//!
//! A 6 × 4 grid of rooms around two corridors, inspired by a university
//! department floor.  Rooms on the main corridor (row 1) are the popular
//! ones; the east wing holds a cafeteria with the highest score.

use pf_core::{GeoPoint, VertexId};
use pf_graph::{GraphResult, PoiGraph, PoiRecord};

pub const COLS: usize = 6;
pub const ROWS: usize = 4;

/// Spacing between neighbouring rooms in degrees (≈ 5.5 m).
const SPACING: f64 = 0.00005;

const ORIGIN: GeoPoint = GeoPoint { lat: 35.144_800, lon: 33.411_000 };

pub fn room(row: usize, col: usize) -> VertexId {
    VertexId((row * COLS + col) as u32)
}

/// Build the floor.  Returns the graph and the id of the cafeteria.
pub fn build_floor() -> GraphResult<(PoiGraph, VertexId)> {
    let cafeteria = room(1, COLS - 1);

    let mut records = Vec::with_capacity(ROWS * COLS);
    for row in 0..ROWS {
        for col in 0..COLS {
            let importance = match (row, col) {
                _ if room(row, col) == cafeteria => 1.0,
                (1, c) => 0.5 + c as f64 * 0.05,
                (_, c) => 0.1 + c as f64 * 0.01,
            };

            let mut neighbours = Vec::with_capacity(4);
            if col + 1 < COLS {
                neighbours.push(room(row, col + 1));
            }
            if col > 0 {
                neighbours.push(room(row, col - 1));
            }
            if row + 1 < ROWS {
                neighbours.push(room(row + 1, col));
            }
            if row > 0 {
                neighbours.push(room(row - 1, col));
            }

            records.push(PoiRecord {
                pos: GeoPoint::new(
                    ORIGIN.lat + row as f64 * SPACING,
                    ORIGIN.lon + col as f64 * SPACING,
                ),
                importance,
                neighbours,
            });
        }
    }

    Ok((PoiGraph::from_records(&records)?, cafeteria))
}

/// The recorded walk: enter at the south-west room, go up to the main
/// corridor, then east to the cafeteria.
pub fn recorded_route() -> Vec<VertexId> {
    let mut route = vec![room(0, 0), room(1, 0)];
    route.extend((1..COLS).map(|c| room(1, c)));
    route
}
