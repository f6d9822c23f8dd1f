//! Graph compilation error.
//!
//! Returned by [`StateGraph::compile`](super::StateGraph::compile) when the entry point,
//! edges or router targets reference unregistered stages.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A stage referenced by an edge or router was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No entry point was set.
    #[error("graph must have an entry point")]
    MissingStart,

    /// No edge or router can reach the terminal route.
    #[error("graph must have at least one route to END")]
    MissingEnd,

    /// A stage has both a fixed edge and a router; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A stage has more than one fixed outgoing edge.
    #[error("node has more than one outgoing edge: {0}")]
    DuplicateEdge(String),

    /// A declared router target is not a registered stage.
    #[error("conditional router invalid target: {0}")]
    InvalidConditionalTarget(String),

    /// No state updater was configured.
    #[error("graph has no state updater")]
    MissingStateUpdater,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_error_display_all_variants() {
        let cases = [
            (CompilationError::NodeNotFound("x".into()), "node not found"),
            (CompilationError::MissingStart, "entry point"),
            (CompilationError::MissingEnd, "END"),
            (
                CompilationError::NodeHasBothEdgeAndConditional("n".into()),
                "both edge",
            ),
            (CompilationError::DuplicateEdge("n".into()), "more than one"),
            (
                CompilationError::InvalidConditionalTarget("t".into()),
                "invalid target",
            ),
            (CompilationError::MissingStateUpdater, "state updater"),
        ];
        for (err, needle) in cases {
            let s = err.to_string();
            assert!(s.contains(needle), "{:?} -> {}", err, s);
        }
    }
}
