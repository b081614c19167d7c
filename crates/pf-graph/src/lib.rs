//! `pf-graph` — indoor POI graph, spatial snapping, and shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`graph`]   | `PoiGraph` (CSR + R-tree), `PoiGraphBuilder`, `PoiRecord`    |
//! | [`oracle`]  | `ShortestPathOracle` trait, `DijkstraOracle`, `CachedOracle` |
//! | [`ordered`] | `TotalF64`, a totally ordered `f64` for heap keys            |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                               |
//!
//! The graph is built once and never mutated afterwards, so a single
//! `Arc<PoiGraph>` (and an `Arc` of any oracle over it) can back many
//! planner instances at once.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `PoiRecord`.            |

pub mod error;
pub mod graph;
pub mod oracle;
pub mod ordered;


pub use error::{GraphError, GraphResult};
pub use graph::{PoiGraph, PoiGraphBuilder, PoiRecord};
pub use oracle::{CachedOracle, DijkstraOracle, ShortestPathOracle};
pub use ordered::TotalF64;
