//! Graph-subsystem error type.

use thiserror::Error;

use pf_core::VertexId;

/// Errors produced while building a [`PoiGraph`](crate::PoiGraph).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge {from} -> {to} points outside the vertex set")]
    DanglingNeighbour { from: VertexId, to: VertexId },
}

pub type GraphResult<T> = Result<T, GraphError>;
