//! Symbolic-to-numeric elimination pipeline
//!
//! This module turns a factor graph plus an elimination ordering into a
//! Bayes net and a graph of leftover factors:
//! - [`VariableIndex`]: factor adjacency by variable
//! - [`Ordering`]: the elimination order
//! - [`EliminationTree`]: tree construction and the post-order elimination
//!   traversal, parameterized by an injected per-node elimination procedure
//!
//! Construction and traversal are single-threaded; a completed tree may be
//! traversed read-only from multiple threads.

use crate::core::Key;
use thiserror::Error;

pub mod elimination_tree;
pub mod ordering;
pub mod variable_index;

pub use elimination_tree::{EliminationTree, Node, NodeIndex};
pub use ordering::Ordering;
pub use variable_index::VariableIndex;

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors raised by the elimination pipeline
///
/// These are surfaced synchronously to the direct caller; there is no
/// internal retry or partial-result salvage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The supplied ordering is unusable (references a variable absent from
    /// the factor graph, or contains a duplicate entry)
    #[error("invalid ordering: {0}")]
    InvalidOrdering(String),

    /// A variable that never appears in any factor was looked up
    #[error("variable {0} does not appear in any factor")]
    UnknownVariable(Key),

    /// The injected elimination procedure failed on some node's factors;
    /// fatal to the whole eliminate call
    #[error("elimination failed: {0}")]
    EliminationFailure(String),
}
