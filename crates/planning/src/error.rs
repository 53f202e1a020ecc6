use crate::vertex::VertexId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("edge {parent} -> {child} references a vertex that is not in the tree")]
    DanglingEdge { parent: VertexId, child: VertexId },
    #[error("vertex {0} is already in the tree")]
    DuplicateVertex(VertexId),
    #[error("vertex {0} is not in the tree")]
    UnknownVertex(VertexId),
    #[error("pose has {got} dimensions, tree stores {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}
