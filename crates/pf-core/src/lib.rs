//! `pf-core` — foundational types for the `rust_pf` prefetch planner.
//!
//! This crate is a dependency of every other `pf-*` crate.  It has no `pf-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VertexId`, `EdgeId`                                  |
//! | [`geo`]         | `GeoPoint`, haversine distance                        |
//! | [`config`]      | `PlannerConfig` and its validation                    |
//! | [`rng`]         | `PlannerRng` (deterministic, seedable)                |
//! | [`error`]       | `PfError`, `PfResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, points and config.  |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::PlannerConfig;
pub use error::{PfError, PfResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, VertexId};
pub use rng::PlannerRng;
