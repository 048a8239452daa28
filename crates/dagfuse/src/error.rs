//! Error types surfaced by the optimizer.

use crate::key::Key;
use thiserror::Error;

/// Everything that can go wrong while building, evaluating, or rewriting a
/// task graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// `get` (or a `SubgraphCallable`) was asked for an output not present
    /// in the graph.
    #[error("key not found in graph: {0:?}")]
    MissingKey(Key),

    /// `toposort` found a back-edge while walking the dependency relation.
    #[error("cycle detected: {cycle:?}")]
    CycleDetected {
        /// A permutation of keys starting and ending at the re-encountered
        /// node, in traversal order.
        cycle: Vec<Key>,
    },

    /// A `SubgraphCallable` was invoked with the wrong number of arguments.
    #[error("arity mismatch: expected {expected} args, got {got}")]
    ArityMismatch { expected: usize, got: usize },
}
