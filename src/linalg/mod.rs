//! Dense linear algebra containers for the elimination pipeline
//!
//! This module provides the block-structured containers used by dense
//! elimination and by downstream consumers of the Bayes net:
//! - Per-variable vector storage ([`VectorValues`])
//! - Column-blocked dense matrices with an active view ([`VerticalBlockMatrix`])
//!
//! All dense storage uses nalgebra.

use thiserror::Error;

pub mod block_matrix;
pub mod vector_values;

pub use block_matrix::VerticalBlockMatrix;
pub use vector_values::VectorValues;

/// Result type for linear algebra operations
pub type LinAlgResult<T> = Result<T, LinAlgError>;

/// Errors raised by the dense containers
///
/// These are expected, caller-recoverable conditions. Structural invariant
/// violations (e.g. non-monotonic block offsets) are programming errors and
/// panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinAlgError {
    /// Insertion into a slot that already exists
    #[error("duplicate key: variable {0} already exists")]
    DuplicateKey(usize),

    /// Arithmetic between structurally incompatible containers
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Slot index beyond the container size
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },
}
