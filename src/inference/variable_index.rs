//! Factor adjacency by variable
//!
//! [`VariableIndex`] maps each variable to the list of factor indices
//! touching it, so tree construction can visit "the factors of variable j"
//! without rescanning the whole graph per variable.

use crate::core::{Factor, FactorGraph, FactorIndex, Key};
use crate::inference::{InferenceError, InferenceResult};
use std::collections::BTreeMap;

/// Precomputed variable-to-factors adjacency for a factor graph
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    index: BTreeMap<Key, Vec<FactorIndex>>,
    n_factors: usize,
    n_entries: usize,
}

impl VariableIndex {
    /// Creates a new, empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the adjacency for `graph`, skipping empty factor slots
    ///
    /// Factor indices are recorded in factor order for each variable.
    pub fn from_graph(graph: &FactorGraph) -> Self {
        let mut result = Self::new();
        result.augment(graph);
        result
    }

    /// Record the factors of `graph` on top of the current contents
    ///
    /// Factor indices continue from the number of factor slots already seen,
    /// so an index built incrementally matches one built from the
    /// concatenated graph.
    pub fn augment(&mut self, graph: &FactorGraph) {
        for (i, slot) in graph.iter().enumerate() {
            if let Some(factor) = slot {
                for &key in factor.keys() {
                    self.index.entry(key).or_default().push(self.n_factors + i);
                    self.n_entries += 1;
                }
            }
        }
        self.n_factors += graph.len();
    }

    /// The factor indices touching `key`
    ///
    /// Fails with [`InferenceError::UnknownVariable`] if the variable has
    /// never appeared in any factor; a known variable with an empty list
    /// (possible after augmentation APIs) is not an error.
    pub fn lookup(&self, key: Key) -> InferenceResult<&[FactorIndex]> {
        self.index
            .get(&key)
            .map(|factors| factors.as_slice())
            .ok_or(InferenceError::UnknownVariable(key))
    }

    /// Number of distinct variables seen
    pub fn n_variables(&self) -> usize {
        self.index.len()
    }

    /// Number of factor slots seen (including empty ones)
    pub fn n_factors(&self) -> usize {
        self.n_factors
    }

    /// Total number of variable-factor incidences
    pub fn n_entries(&self) -> usize {
        self.n_entries
    }

    /// Iterate over `(key, factor indices)` pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (Key, &[FactorIndex])> {
        self.index.iter().map(|(&k, v)| (k, v.as_slice()))
    }
}
