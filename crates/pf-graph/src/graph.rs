//! Indoor POI graph and its builder.
//!
//! # Data layout
//!
//! Outgoing corridors are stored in **Compressed Sparse Row (CSR)** format.
//! Given a `VertexId v`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ vertex_out_start[v] .. vertex_out_start[v+1] ]
//! ```
//!
//! Within that slice edges keep the order they were added, so
//! [`PoiGraph::neighbours`] reproduces each POI's adjacency list exactly.
//! Breadth-first destination discovery depends on that order.
//!
//! Edge weights are always the haversine distance between the endpoints; they
//! are derived at build time and never supplied by the caller.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `VertexId`.  A
//! trace-replay driver uses it to turn a recorded position into the POI the
//! planner is called with.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::debug;

use pf_core::{EdgeId, GeoPoint, VertexId};

use crate::{GraphError, GraphResult};

// ── Topology input ────────────────────────────────────────────────────────────

/// One POI as delivered by the building loader: position, precomputed
/// importance score, and its ordered neighbour list.
///
/// The record's id is its position in the slice passed to
/// [`PoiGraph::from_records`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoiRecord {
    pub pos:        GeoPoint,
    pub importance: f64,
    pub neighbours: Vec<VertexId>,
}

// ── R-tree vertex entry ───────────────────────────────────────────────────────

#[derive(Clone)]
struct VertexEntry {
    point: [f64; 2], // [lat, lon]
    id:    VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    /// Squared Euclidean distance in degree space.  At building scale the
    /// ranking matches haversine ranking.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── PoiGraph ──────────────────────────────────────────────────────────────────

/// Directed POI graph in CSR format plus a spatial index for snapping.
///
/// Read-only after [`PoiGraphBuilder::build`].
pub struct PoiGraph {
    // ── Vertex data ───────────────────────────────────────────────────────
    /// Geographic position of each vertex.  Indexed by `VertexId`.
    pub vertex_pos: Vec<GeoPoint>,

    /// Precomputed importance (e.g. PageRank) of each vertex.
    pub vertex_importance: Vec<f64>,

    /// CSR row pointer.  Length = `vertex_count + 1`.
    pub vertex_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<VertexId>,
    pub edge_to:   Vec<VertexId>,

    /// Haversine length of each edge in metres.
    pub edge_length_m: Vec<f64>,

    spatial_idx: RTree<VertexEntry>,
}

impl PoiGraph {
    /// Build the graph from loader records, validating every neighbour id.
    pub fn from_records(records: &[PoiRecord]) -> GraphResult<PoiGraph> {
        let edges = records.iter().map(|r| r.neighbours.len()).sum();
        let mut b = PoiGraphBuilder::with_capacity(records.len(), edges);
        for r in records {
            b.add_vertex(r.pos, r.importance);
        }
        for (i, r) in records.iter().enumerate() {
            let from = VertexId(i as u32);
            for &to in &r.neighbours {
                b.add_directed_edge(from, to);
            }
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertex_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        v.index() < self.vertex_count()
    }

    // ── Vertex attributes ─────────────────────────────────────────────────

    #[inline]
    pub fn pos(&self, v: VertexId) -> GeoPoint {
        self.vertex_pos[v.index()]
    }

    #[inline]
    pub fn importance(&self, v: VertexId) -> f64 {
        self.vertex_importance[v.index()]
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// `EdgeId`s of all outgoing edges from `v`, in adjacency-list order.
    #[inline]
    pub fn out_edges(&self, v: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.vertex_out_start[v.index()] as usize;
        let end   = self.vertex_out_start[v.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Neighbours of `v`, in adjacency-list order.
    #[inline]
    pub fn neighbours(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges(v).map(|e| self.edge_to[e.index()])
    }

    #[inline]
    pub fn out_degree(&self, v: VertexId) -> usize {
        let start = self.vertex_out_start[v.index()] as usize;
        let end   = self.vertex_out_start[v.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The vertex nearest to `pos`, or `None` for an empty graph.
    pub fn snap_to_vertex(&self, pos: GeoPoint) -> Option<VertexId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Up to `k` vertices nearest to `pos`, closest first.
    pub fn k_nearest_vertices(&self, pos: GeoPoint, k: usize) -> Vec<VertexId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── PoiGraphBuilder ───────────────────────────────────────────────────────────

/// Construct a [`PoiGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use pf_core::GeoPoint;
/// use pf_graph::PoiGraphBuilder;
///
/// let mut b = PoiGraphBuilder::new();
/// let lobby = b.add_vertex(GeoPoint::new(35.1450, 33.4110), 0.4);
/// let cafe  = b.add_vertex(GeoPoint::new(35.1451, 33.4112), 0.9);
/// b.add_corridor(lobby, cafe);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.vertex_count(), 2);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub struct PoiGraphBuilder {
    vertices:   Vec<GeoPoint>,
    importance: Vec<f64>,
    raw_edges:  Vec<(VertexId, VertexId)>,
}

impl PoiGraphBuilder {
    pub fn new() -> Self {
        Self { vertices: Vec::new(), importance: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices:   Vec::with_capacity(vertices),
            importance: Vec::with_capacity(vertices),
            raw_edges:  Vec::with_capacity(edges),
        }
    }

    /// Add a POI and return its `VertexId` (sequential from 0).
    pub fn add_vertex(&mut self, pos: GeoPoint, importance: f64) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(pos);
        self.importance.push(importance);
        id
    }

    /// Add a **directed** edge.  It is appended to `from`'s adjacency list.
    pub fn add_directed_edge(&mut self, from: VertexId, to: VertexId) {
        self.raw_edges.push((from, to));
    }

    /// Add edges in both directions; `a → b` is appended first.
    pub fn add_corridor(&mut self, a: VertexId, b: VertexId) {
        self.add_directed_edge(a, b);
        self.add_directed_edge(b, a);
    }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`PoiGraph`].
    ///
    /// Fails if any edge endpoint was never added as a vertex.
    pub fn build(self) -> GraphResult<PoiGraph> {
        let vertex_count = self.vertices.len();

        if let Some(&(from, to)) = self
            .raw_edges
            .iter()
            .find(|(f, t)| f.index() >= vertex_count || t.index() >= vertex_count)
        {
            return Err(GraphError::DanglingNeighbour { from, to });
        }

        // Stable: per-vertex edge order must survive the sort.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|&(from, _)| from.0);

        let edge_from: Vec<VertexId> = raw.iter().map(|&(f, _)| f).collect();
        let edge_to:   Vec<VertexId> = raw.iter().map(|&(_, t)| t).collect();
        let edge_length_m: Vec<f64> = raw
            .iter()
            .map(|&(f, t)| self.vertices[f.index()].distance_m(self.vertices[t.index()]))
            .collect();

        let mut vertex_out_start = vec![0u32; vertex_count + 1];
        for &(from, _) in &raw {
            vertex_out_start[from.index() + 1] += 1;
        }
        for i in 1..=vertex_count {
            vertex_out_start[i] += vertex_out_start[i - 1];
        }
        debug_assert_eq!(vertex_out_start[vertex_count] as usize, raw.len());

        let entries: Vec<VertexEntry> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, &pos)| VertexEntry { point: [pos.lat, pos.lon], id: VertexId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        debug!(vertices = vertex_count, edges = raw.len(), "built POI graph");

        Ok(PoiGraph {
            vertex_pos: self.vertices,
            vertex_importance: self.importance,
            vertex_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            spatial_idx,
        })
    }
}

impl Default for PoiGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
