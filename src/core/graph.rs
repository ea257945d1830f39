//! Factor graph and Bayes net containers
//!
//! A [`FactorGraph`] is an indexable sequence of optional shared factor
//! references. Slots may be empty (`None`), e.g. after a factor has been
//! moved elsewhere; containers preserve slot positions so factor indices
//! stay stable. A [`BayesNet`] accumulates the conditionals produced by
//! elimination, in elimination (post-order) order.

use crate::core::factor::{Conditional, Factor, FactorIndex, Key, SharedConditional, SharedFactor};
use std::collections::BTreeSet;
use std::ops::Index;

/// An ordered collection of factors over a set of variables
#[derive(Debug, Clone, Default)]
pub struct FactorGraph {
    factors: Vec<Option<SharedFactor>>,
}

impl FactorGraph {
    /// Creates a new, empty factor graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of factor slots, including empty ones
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Check if the graph holds no factor slots
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Add a factor and return its index
    pub fn push(&mut self, factor: SharedFactor) -> FactorIndex {
        self.factors.push(Some(factor));
        self.factors.len() - 1
    }

    /// Add an empty slot (placeholder keeping subsequent indices stable)
    pub fn push_none(&mut self) -> FactorIndex {
        self.factors.push(None);
        self.factors.len() - 1
    }

    /// Add an optional factor slot as-is
    pub fn push_slot(&mut self, slot: Option<SharedFactor>) -> FactorIndex {
        self.factors.push(slot);
        self.factors.len() - 1
    }

    /// Get the factor at `index`, `None` for an empty or out-of-range slot
    pub fn get(&self, index: FactorIndex) -> Option<&SharedFactor> {
        self.factors.get(index).and_then(|slot| slot.as_ref())
    }

    /// Iterate over all slots in index order
    pub fn iter(&self) -> std::slice::Iter<'_, Option<SharedFactor>> {
        self.factors.iter()
    }

    /// Number of populated (non-empty) slots
    pub fn num_factors(&self) -> usize {
        self.factors.iter().filter(|slot| slot.is_some()).count()
    }

    /// All distinct variable keys appearing in any factor, ascending
    pub fn keys(&self) -> Vec<Key> {
        let keys: BTreeSet<Key> = self
            .factors
            .iter()
            .flatten()
            .flat_map(|factor| factor.keys().iter().copied())
            .collect();
        keys.into_iter().collect()
    }

    /// Approximate equality: same slot count, slot-wise presence and
    /// factor equality within `tol`
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        if self.factors.len() != other.factors.len() {
            return false;
        }
        self.factors
            .iter()
            .zip(other.factors.iter())
            .all(|(a, b)| match (a, b) {
                (Some(fa), Some(fb)) => fa.equals_factor(fb.as_ref(), tol),
                (None, None) => true,
                _ => false,
            })
    }
}

impl Index<FactorIndex> for FactorGraph {
    type Output = Option<SharedFactor>;

    fn index(&self, index: FactorIndex) -> &Self::Output {
        &self.factors[index]
    }
}

impl FromIterator<SharedFactor> for FactorGraph {
    fn from_iter<I: IntoIterator<Item = SharedFactor>>(iter: I) -> Self {
        Self {
            factors: iter.into_iter().map(Some).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FactorGraph {
    type Item = &'a Option<SharedFactor>;
    type IntoIter = std::slice::Iter<'a, Option<SharedFactor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.factors.iter()
    }
}

/// The output of elimination: conditionals in post-order elimination order
#[derive(Debug, Clone, Default)]
pub struct BayesNet {
    conditionals: Vec<SharedConditional>,
}

impl BayesNet {
    /// Creates a new, empty Bayes net
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conditionals
    pub fn len(&self) -> usize {
        self.conditionals.len()
    }

    /// Check if the Bayes net is empty
    pub fn is_empty(&self) -> bool {
        self.conditionals.is_empty()
    }

    /// Append a conditional (elimination order is append order)
    pub fn push(&mut self, conditional: SharedConditional) {
        self.conditionals.push(conditional);
    }

    /// Get the conditional at `index`
    pub fn get(&self, index: usize) -> Option<&SharedConditional> {
        self.conditionals.get(index)
    }

    /// Iterate over conditionals in elimination order
    pub fn iter(&self) -> std::slice::Iter<'_, SharedConditional> {
        self.conditionals.iter()
    }

    /// Approximate equality: same length, pairwise conditional equality
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        self.conditionals.len() == other.conditionals.len()
            && self
                .conditionals
                .iter()
                .zip(other.conditionals.iter())
                .all(|(a, b)| a.equals_conditional(b.as_ref(), tol))
    }
}

impl Index<usize> for BayesNet {
    type Output = SharedConditional;

    fn index(&self, index: usize) -> &Self::Output {
        &self.conditionals[index]
    }
}

impl<'a> IntoIterator for &'a BayesNet {
    type Item = &'a SharedConditional;
    type IntoIter = std::slice::Iter<'a, SharedConditional>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::factor::Factor;
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestFactor {
        keys: Vec<Key>,
    }

    impl TestFactor {
        fn shared(keys: &[Key]) -> SharedFactor {
            Arc::new(TestFactor {
                keys: keys.to_vec(),
            })
        }
    }

    impl Factor for TestFactor {
        fn keys(&self) -> &[Key] {
            &self.keys
        }

        fn equals_factor(&self, other: &dyn Factor, _tol: f64) -> bool {
            self.keys == other.keys()
        }
    }

    #[test]
    fn test_push_and_index() {
        let mut graph = FactorGraph::new();
        let i0 = graph.push(TestFactor::shared(&[0, 1]));
        let i1 = graph.push_none();
        let i2 = graph.push(TestFactor::shared(&[1, 2]));

        assert_eq!((i0, i1, i2), (0, 1, 2));
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.num_factors(), 2);
        assert!(graph[1].is_none());
        assert_eq!(graph.get(2).map(|f| f.keys()), Some(&[1, 2][..]));
        assert!(graph.get(5).is_none());
    }

    #[test]
    fn test_keys_sorted_distinct() {
        let mut graph = FactorGraph::new();
        graph.push(TestFactor::shared(&[3, 1]));
        graph.push(TestFactor::shared(&[1, 0]));

        assert_eq!(graph.keys(), vec![0, 1, 3]);
    }

    #[test]
    fn test_graph_equals_presence() {
        let mut a = FactorGraph::new();
        a.push(TestFactor::shared(&[0]));
        a.push_none();

        let mut b = FactorGraph::new();
        b.push(TestFactor::shared(&[0]));
        b.push_none();

        assert!(a.equals(&b, 1e-9));

        let mut c = FactorGraph::new();
        c.push(TestFactor::shared(&[0]));
        c.push(TestFactor::shared(&[0]));
        assert!(!a.equals(&c, 1e-9));
    }
}
