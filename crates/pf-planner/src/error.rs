use pf_core::{PfError, VertexId};
use pf_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planner configuration error: {0}")]
    Config(#[from] PfError),

    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),

    #[error("start {start} is outside a graph of {vertex_count} vertices")]
    StartOutOfRange {
        start:        VertexId,
        vertex_count: usize,
    },
}

pub type PlanResult<T> = Result<T, PlanError>;
