use std::time::Duration;
use thiserror::Error;

use crate::graph::{NodeId, Weight};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RdmstError {
    #[error("root node '{0}' does not exist in the graph")]
    RootNotFound(String),
    #[error("node '{node}' is not reachable from root '{root}'")]
    UnreachableNode { root: String, node: String },
    /// A non-root node ended up without any incoming edge. Validation rules
    /// this out, so seeing it means an internal invariant broke.
    #[error("node handle {0} has no incoming edge")]
    NoIncomingEdge(NodeId),
    #[error("pseudo-node handle {0} collides with a live node")]
    IdentifierCollision(NodeId),
    #[error("edge '{from}' -> '{to}' has invalid weight {weight}")]
    InvalidWeight {
        from: String,
        to: String,
        weight: Weight,
    },
    #[error("node '{0}' has a self-loop")]
    SelfLoop(String),
    #[error("solve exceeded its time limit of {0:?}")]
    DeadlineExceeded(Duration),
}

impl RdmstError {
    /// True for errors caused by the input rather than by the solver.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            RdmstError::RootNotFound(_)
                | RdmstError::UnreachableNode { .. }
                | RdmstError::InvalidWeight { .. }
                | RdmstError::SelfLoop(_)
        )
    }
}
