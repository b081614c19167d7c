//! `pf-planner` — destination selection and best-first prefetch planning.
//!
//! # One planning call
//!
//! ```text
//! plan(start):
//!   ① Destinations — BFS up to K hops from `start`, rank by importance,
//!                    keep the top M (once, or every call in recompute mode).
//!   ② Seed         — root node at `start`, unassigned, cost 0.
//!   ③ Loop         — pop the cheapest node (weight1 + weight2, FIFO ties):
//!                      start / already emitted → skip, still expand
//!                      destination finished    → reassign to nearest
//!                                                unfinished, re-queue
//!                      otherwise               → accept; mark destination
//!                                                finished if reached
//!                    expand unseen neighbours (weight2 from the oracle).
//!   ④ Stop         — budget reached or frontier empty; return ids in
//!                    acceptance order.
//! ```
//!
//! Once every destination of a call is finished, each further accepted node
//! is given a random destination from the planner's seeded RNG, so the loop
//! keeps making progress until the frontier empties or the budget is met.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pf_core::{PlannerConfig, VertexId};
//! use pf_graph::PoiGraph;
//! use pf_planner::PlannerBuilder;
//!
//! let graph = Arc::new(PoiGraph::from_records(&records)?);
//! let mut planner = PlannerBuilder::new(graph, PlannerConfig::default()).build()?;
//! let blocks = planner.plan(VertexId(0))?;
//! ```

pub mod builder;
pub mod error;
pub mod frontier;
pub mod observer;
pub mod planner;
pub mod selector;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use builder::{DefaultOracle, PlannerBuilder, DEFAULT_CACHED_SOURCES};
pub use error::{PlanError, PlanResult};
pub use observer::{NoopObserver, PlanObserver};
pub use planner::{PathPlanner, PlanReport};
pub use selector::{select_destinations, DestinationSelector};
pub use strategy::PrefetchStrategy;
