//! Error types for the apex-inference library
//!
//! This module provides the main error and result types used throughout the library.
//! All errors use the `thiserror` crate for automatic trait implementations.

use crate::{inference::InferenceError, linalg::LinAlgError};
use thiserror::Error;

/// Main result type used throughout the apex-inference library
pub type ApexResult<T> = Result<T, ApexError>;

/// Main error type for the apex-inference library
#[derive(Debug, Clone, Error)]
pub enum ApexError {
    /// Inference related errors (ordering, elimination, variable lookup)
    #[error("Inference error: {0}")]
    Inference(String),

    /// Linear algebra related errors
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),

    /// General computation errors
    #[error("Computation error: {0}")]
    Computation(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// Convert module-specific errors to ApexError

impl From<InferenceError> for ApexError {
    fn from(err: InferenceError) -> Self {
        ApexError::Inference(err.to_string())
    }
}

impl From<LinAlgError> for ApexError {
    fn from(err: LinAlgError) -> Self {
        ApexError::LinearAlgebra(err.to_string())
    }
}
