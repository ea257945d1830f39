//! Factor and conditional abstractions
//!
//! Factors are treated as immutable once placed in a graph. The elimination
//! pipeline never clones factor contents; only shared references move between
//! the original graph, tree nodes, and separator outputs. `Arc` makes
//! concurrent read-only traversal of a completed tree safe without locking.

use std::fmt;
use std::sync::Arc;

/// Unique identifier for variables (small non-negative integer)
pub type Key = usize;

/// Index of a factor within its owning [`FactorGraph`](crate::core::FactorGraph)
pub type FactorIndex = usize;

/// A factor over a set of variables
///
/// The concrete factor algebra (Jacobian, Hessian, symbolic, ...) lives in
/// downstream crates; the inference core only needs the variable footprint,
/// an approximate-equality predicate and a debug representation.
pub trait Factor: fmt::Debug + Send + Sync {
    /// The variables this factor touches, in the factor's own order
    fn keys(&self) -> &[Key];

    /// Approximate equality against another factor, within `tol`
    fn equals_factor(&self, other: &dyn Factor, tol: f64) -> bool;
}

/// A shared, immutable reference to a factor
pub type SharedFactor = Arc<dyn Factor>;

/// A conditional density produced by eliminating one variable
///
/// The first `nr_frontals` keys are the frontal (eliminated) variables, the
/// rest are the separator (parent) variables.
pub trait Conditional: fmt::Debug + Send + Sync {
    /// Frontal keys followed by separator keys
    fn keys(&self) -> &[Key];

    /// Number of frontal variables (one per elimination step in this core)
    fn nr_frontals(&self) -> usize {
        1
    }

    /// Approximate equality against another conditional, within `tol`
    fn equals_conditional(&self, other: &dyn Conditional, tol: f64) -> bool;
}

/// A shared, immutable reference to a conditional
pub type SharedConditional = Arc<dyn Conditional>;
