//! Elimination tree construction and traversal
//!
//! An elimination tree has one node per ordered variable; a node's ancestors
//! are exactly the variables its elimination step transitively depends on.
//! Construction is a single column-by-column sweep over the variable index,
//! linking subtrees with a parent-pointer union-find walk. Eliminating the
//! tree runs an injected per-node procedure in post-order, accumulating
//! conditionals into a Bayes net and passing separator factors up to each
//! parent.
//!
//! Nodes live in an arena with index-based child lists, so the forest is
//! acyclic by construction and cloning the tree deep-copies structure while
//! sharing factor references.

use crate::core::{BayesNet, Factor, FactorGraph, Key, SharedConditional, SharedFactor};
use crate::inference::{InferenceError, InferenceResult, Ordering, VariableIndex};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Index of a node within the tree's arena
pub type NodeIndex = usize;

const NONE: usize = usize::MAX;

/// One node of the elimination tree: a variable, the factors first touched
/// at it, and its child subtrees
#[derive(Debug, Clone)]
pub struct Node {
    /// The variable this node eliminates
    pub key: Key,
    /// Factors whose first ordered variable is this node's key; slots are
    /// shared references into the original graph, possibly empty
    pub factors: Vec<Option<SharedFactor>>,
    /// Child nodes, in attachment order
    pub children: Vec<NodeIndex>,
}

/// A forest over the ordered variables of a factor graph
///
/// Holds the node arena, the forest roots (in ordering-index order) and the
/// factors touching no ordered variable. Immutable after construction apart
/// from whole-tree clone and [`swap`](EliminationTree::swap).
#[derive(Debug, Clone, Default)]
pub struct EliminationTree {
    nodes: Vec<Node>,
    roots: Vec<NodeIndex>,
    remaining_factors: Vec<Option<SharedFactor>>,
}

impl EliminationTree {
    /// Build the tree for `graph` under `ordering`, using a precomputed
    /// variable index
    ///
    /// In the case of partial elimination the ordering may cover fewer
    /// variables than the graph; factors touching none of the ordered
    /// variables end up in [`remaining_factors`](Self::remaining_factors).
    ///
    /// Fails with [`InferenceError::InvalidOrdering`] if the ordering
    /// references a variable absent from the graph or repeats a variable.
    pub fn new(
        graph: &FactorGraph,
        structure: &VariableIndex,
        ordering: &Ordering,
    ) -> InferenceResult<Self> {
        let m = graph.len();
        let n = ordering.len();

        let mut seen = HashSet::with_capacity(n);
        for &key in ordering {
            if !seen.insert(key) {
                return Err(InferenceError::InvalidOrdering(format!(
                    "ordering eliminates variable {key} more than once"
                )));
            }
        }

        let mut nodes: Vec<Node> = Vec::with_capacity(n);
        let mut parents = vec![NONE; n];
        let mut prev_col = vec![NONE; m];
        let mut factor_used = vec![false; m];

        // for column j in 1..n do
        for j in 0..n {
            let key = ordering[j];
            let factors = structure.lookup(key).map_err(|_| {
                InferenceError::InvalidOrdering(format!(
                    "ordering references variable {key}, which is not involved in the factor graph"
                ))
            })?;
            nodes.push(Node {
                key,
                factors: Vec::new(),
                children: Vec::new(),
            });

            // for row i in Struct[A*j] do
            for &i in factors {
                if prev_col[i] != NONE {
                    // A variable of factor i was already hit: the subtree
                    // containing it must be eliminated before this node.
                    // Find its current root by walking parent pointers (no
                    // path compression).
                    let mut r = prev_col[i];
                    while parents[r] != NONE {
                        r = parents[r];
                    }
                    // r == j means the factor revisits the same subtree
                    // without a new dependency
                    if r != j {
                        parents[r] = j;
                        nodes[j].children.push(r);
                    }
                } else {
                    // First ordered variable touching factor i: it lives here
                    nodes[j].factors.push(graph[i].clone());
                    factor_used[i] = true;
                }
                prev_col[i] = j;
            }
        }

        // The last-eliminated node has nothing left to depend on
        debug_assert!(
            n == 0 || parents[n - 1] == NONE,
            "EliminationTree: last-eliminated node must be a forest root"
        );

        let roots: Vec<NodeIndex> = (0..n).filter(|&j| parents[j] == NONE).collect();
        let remaining_factors: Vec<Option<SharedFactor>> = (0..m)
            .filter(|&i| !factor_used[i])
            .map(|i| graph[i].clone())
            .collect();

        debug!(
            n_nodes = n,
            n_roots = roots.len(),
            n_remaining = remaining_factors.len(),
            "built elimination tree"
        );

        Ok(Self {
            nodes,
            roots,
            remaining_factors,
        })
    }

    /// Build the tree for `graph` under `ordering`, computing the variable
    /// index internally
    pub fn from_graph(graph: &FactorGraph, ordering: &Ordering) -> InferenceResult<Self> {
        let structure = VariableIndex::from_graph(graph);
        Self::new(graph, &structure, ordering)
    }

    /// The forest roots, in ordering-index order
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Factors touching no ordered variable
    pub fn remaining_factors(&self) -> &[Option<SharedFactor>] {
        &self.remaining_factors
    }

    /// The node at `index`
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// All nodes, in ordering-index order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Exchange contents with `other` in constant time
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Eliminate every variable of the forest with the injected procedure
    ///
    /// Runs a depth-first, children-before-parent traversal of each root in
    /// root-list order. For each node the procedure receives the node's own
    /// factors followed by the children's separator factors in child order,
    /// plus the single key to eliminate; its conditional is appended to the
    /// Bayes net in post-order and its separator factor is handed to the
    /// parent. A root's separator factor is discarded: the top of each tree
    /// fully consumes its elimination result into the conditional.
    ///
    /// Returns the Bayes net and the remaining factor graph (the factors
    /// untouched by construction). A procedure failure aborts the whole call
    /// with no partial output. The tree itself is not mutated.
    pub fn eliminate<F>(&self, function: F) -> InferenceResult<(BayesNet, FactorGraph)>
    where
        F: Fn(&[SharedFactor], &[Key]) -> InferenceResult<(SharedConditional, SharedFactor)>,
    {
        let mut bayes_net = BayesNet::new();
        // One separator slot per node, filled when the node is eliminated
        let mut separators: Vec<Option<SharedFactor>> = vec![None; self.nodes.len()];

        for &root in &self.roots {
            // Post-order via an explicit stack; the second visit of a node
            // happens once all its children have produced separators
            let mut stack: Vec<(NodeIndex, bool)> = vec![(root, false)];
            while let Some((index, expanded)) = stack.pop() {
                let node = &self.nodes[index];
                if !expanded {
                    stack.push((index, true));
                    for &child in node.children.iter().rev() {
                        stack.push((child, false));
                    }
                    continue;
                }

                let mut gathered: Vec<SharedFactor> =
                    Vec::with_capacity(node.factors.len() + node.children.len());
                gathered.extend(node.factors.iter().flatten().cloned());
                for &child in &node.children {
                    if let Some(separator) = separators[child].take() {
                        gathered.push(separator);
                    }
                }

                let (conditional, separator) = function(&gathered, &[node.key])?;
                bayes_net.push(conditional);
                separators[index] = Some(separator);
            }
            // Eliminated against nothing above it
            separators[root] = None;
        }

        let mut remaining = FactorGraph::new();
        for slot in &self.remaining_factors {
            remaining.push_slot(slot.clone());
        }

        debug!(
            n_conditionals = bayes_net.len(),
            n_remaining = remaining.len(),
            "eliminated forest"
        );

        Ok((bayes_net, remaining))
    }

    /// Structural approximate equality
    ///
    /// Both forests are traversed in a canonical order (roots and children
    /// visited in ascending key order, regardless of insertion order); keys
    /// must match and factor slots must match presence-wise and by the
    /// factors' own approximate-equality check within `tol`.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        let mut stack1 = sorted_by_key(self, &self.roots);
        let mut stack2 = sorted_by_key(other, &other.roots);

        loop {
            match (stack1.pop(), stack2.pop()) {
                (Some(i1), Some(i2)) => {
                    let node1 = &self.nodes[i1];
                    let node2 = &other.nodes[i2];
                    if node1.key != node2.key || node1.factors.len() != node2.factors.len() {
                        return false;
                    }
                    for (f1, f2) in node1.factors.iter().zip(node2.factors.iter()) {
                        match (f1, f2) {
                            (Some(a), Some(b)) => {
                                if !a.equals_factor(b.as_ref(), tol) {
                                    return false;
                                }
                            }
                            (None, None) => {}
                            _ => return false,
                        }
                    }
                    stack1.extend(sorted_by_key(self, &node1.children));
                    stack2.extend(sorted_by_key(other, &node2.children));
                }
                // One forest ran out of nodes before the other
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    /// Write an indented rendering of the forest to `writer`
    ///
    /// Debug helper; the sink is injected so the core has no global I/O.
    pub fn write_forest<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        for &root in &self.roots {
            self.write_subtree(writer, root, 0)?;
        }
        if !self.remaining_factors.is_empty() {
            writeln!(writer, "remaining: {} factor(s)", self.remaining_factors.len())?;
        }
        Ok(())
    }

    fn write_subtree<W: fmt::Write>(
        &self,
        writer: &mut W,
        index: NodeIndex,
        depth: usize,
    ) -> fmt::Result {
        let node = &self.nodes[index];
        let indent = "  ".repeat(depth);
        writeln!(writer, "{indent}({})", node.key)?;
        for slot in &node.factors {
            match slot {
                Some(factor) => writeln!(writer, "{indent}| {factor:?}")?,
                None => writeln!(writer, "{indent}| empty factor slot")?,
            }
        }
        for &child in &node.children {
            self.write_subtree(writer, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for EliminationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_forest(f)
    }
}

/// Indices sorted ascending by node key, reversed so a stack pops the
/// smallest key first
fn sorted_by_key(tree: &EliminationTree, indices: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut sorted = indices.to_vec();
    sorted.sort_by_key(|&i| tree.nodes[i].key);
    sorted.reverse();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Conditional, Factor};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct SymbolicFactor {
        keys: Vec<Key>,
    }

    impl SymbolicFactor {
        fn shared(keys: &[Key]) -> SharedFactor {
            Arc::new(SymbolicFactor {
                keys: keys.to_vec(),
            })
        }
    }

    impl Factor for SymbolicFactor {
        fn keys(&self) -> &[Key] {
            &self.keys
        }

        fn equals_factor(&self, other: &dyn Factor, _tol: f64) -> bool {
            self.keys == other.keys()
        }
    }

    #[derive(Debug)]
    struct SymbolicConditional {
        keys: Vec<Key>, // frontal first, then parents
    }

    impl Conditional for SymbolicConditional {
        fn keys(&self) -> &[Key] {
            &self.keys
        }

        fn equals_conditional(&self, other: &dyn Conditional, _tol: f64) -> bool {
            self.keys == other.keys()
        }
    }

    /// Symbolic elimination: the separator is the union of all involved
    /// keys minus the frontal
    fn eliminate_symbolic(
        factors: &[SharedFactor],
        keys: &[Key],
    ) -> InferenceResult<(SharedConditional, SharedFactor)> {
        let frontal = keys[0];
        let mut separator: BTreeSet<Key> = factors
            .iter()
            .flat_map(|f| f.keys().iter().copied())
            .collect();
        separator.remove(&frontal);

        let parents: Vec<Key> = separator.into_iter().collect();
        let mut conditional_keys = vec![frontal];
        conditional_keys.extend(&parents);

        Ok((
            Arc::new(SymbolicConditional {
                keys: conditional_keys,
            }),
            Arc::new(SymbolicFactor { keys: parents }),
        ))
    }

    /// x0 - x1 - x2 chain: one factor per consecutive pair plus a prior on x0
    fn chain_graph() -> FactorGraph {
        let mut graph = FactorGraph::new();
        graph.push(SymbolicFactor::shared(&[0]));
        graph.push(SymbolicFactor::shared(&[0, 1]));
        graph.push(SymbolicFactor::shared(&[1, 2]));
        graph
    }

    #[test]
    fn test_chain_is_single_path() {
        let graph = chain_graph();
        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        assert_eq!(tree.roots(), &[2]);
        assert!(tree.remaining_factors().is_empty());

        // x2 <- x1 <- x0, factors attached at their first ordered variable
        let x2 = tree.node(2);
        assert_eq!((x2.key, x2.children.as_slice()), (2, &[1][..]));
        assert!(x2.factors.is_empty());
        let x1 = tree.node(1);
        assert_eq!((x1.key, x1.children.as_slice()), (1, &[0][..]));
        assert_eq!(x1.factors.len(), 1);
        let x0 = tree.node(0);
        assert_eq!((x0.key, x0.factors.len(), x0.children.len()), (0, 2, 0));
    }

    #[test]
    fn test_factor_partition_invariant() {
        let mut graph = chain_graph();
        graph.push(SymbolicFactor::shared(&[5])); // outside the ordering
        graph.push_none();

        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        let in_nodes: usize = tree.nodes().iter().map(|n| n.factors.len()).sum();
        assert_eq!(in_nodes + tree.remaining_factors().len(), graph.len());
    }

    #[test]
    fn test_excluded_variable_factor_goes_to_remaining() {
        let mut graph = chain_graph();
        graph.push(SymbolicFactor::shared(&[5]));

        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        assert_eq!(tree.remaining_factors().len(), 1);
        let remaining = tree.remaining_factors()[0].as_ref().unwrap();
        assert_eq!(remaining.keys(), &[5]);
        assert!(tree.nodes().iter().all(|n| n
            .factors
            .iter()
            .flatten()
            .all(|f| f.keys() != [5])));
    }

    #[test]
    fn test_invalid_ordering_unknown_variable() {
        let graph = chain_graph();
        let result = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 7]));
        assert!(matches!(
            result,
            Err(InferenceError::InvalidOrdering(msg)) if msg.contains('7')
        ));
    }

    #[test]
    fn test_invalid_ordering_duplicate_variable() {
        let graph = chain_graph();
        let result = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 0]));
        assert!(matches!(result, Err(InferenceError::InvalidOrdering(_))));
    }

    #[test]
    fn test_eliminate_chain() {
        let graph = chain_graph();
        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        let (bayes_net, remaining) = tree.eliminate(eliminate_symbolic).unwrap();

        assert_eq!(bayes_net.len(), 3);
        assert_eq!(bayes_net[0].keys(), &[0, 1]); // P(x0 | x1)
        assert_eq!(bayes_net[1].keys(), &[1, 2]); // P(x1 | x2)
        assert_eq!(bayes_net[2].keys(), &[2]); // P(x2)
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_eliminate_matches_manual_sequence() {
        // Chain with a loop closure x0 - x2
        let mut graph = chain_graph();
        graph.push(SymbolicFactor::shared(&[0, 2]));
        let ordering = Ordering::from(vec![0, 1, 2]);

        let tree = EliminationTree::from_graph(&graph, &ordering).unwrap();
        let (bayes_net, _) = tree.eliminate(eliminate_symbolic).unwrap();

        // Manual variable-by-variable elimination over a shrinking factor set
        let mut pending: Vec<SharedFactor> = graph.iter().flatten().cloned().collect();
        let mut expected = BayesNet::new();
        for &key in &ordering {
            let (involved, rest): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|f| f.keys().contains(&key));
            let (conditional, separator) = eliminate_symbolic(&involved, &[key]).unwrap();
            expected.push(conditional);
            pending = rest;
            if !separator.keys().is_empty() {
                pending.push(separator);
            }
        }

        assert!(bayes_net.equals(&expected, 1e-9));
    }

    #[test]
    fn test_eliminate_forest_root_by_root() {
        // Two disconnected components: {0,1} and {2,3}
        let mut graph = FactorGraph::new();
        graph.push(SymbolicFactor::shared(&[0, 1]));
        graph.push(SymbolicFactor::shared(&[2, 3]));

        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 2, 1, 3])).unwrap();
        assert_eq!(tree.roots().len(), 2);

        let (bayes_net, remaining) = tree.eliminate(eliminate_symbolic).unwrap();

        // Each root processed fully post-order before the next
        assert_eq!(bayes_net.len(), 4);
        assert_eq!(bayes_net[0].keys(), &[0, 1]);
        assert_eq!(bayes_net[1].keys(), &[1]);
        assert_eq!(bayes_net[2].keys(), &[2, 3]);
        assert_eq!(bayes_net[3].keys(), &[3]);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_eliminate_failure_is_fatal() {
        let graph = chain_graph();
        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        let result = tree.eliminate(|_, keys| {
            Err(InferenceError::EliminationFailure(format!(
                "singular system at variable {}",
                keys[0]
            )))
        });
        assert!(matches!(
            result,
            Err(InferenceError::EliminationFailure(_))
        ));
    }

    #[test]
    fn test_equals_reflexive_and_clone() {
        let graph = chain_graph();
        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        assert!(tree.equals(&tree, 0.0));
        let copy = tree.clone();
        assert!(tree.equals(&copy, 1e-9));
    }

    #[test]
    fn test_equals_detects_structural_differences() {
        let graph = chain_graph();
        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        // Removed node
        let mut shorter = FactorGraph::new();
        shorter.push(SymbolicFactor::shared(&[0]));
        shorter.push(SymbolicFactor::shared(&[0, 1]));
        let two = EliminationTree::from_graph(&shorter, &Ordering::from(vec![0, 1])).unwrap();
        assert!(!tree.equals(&two, 1e-9));

        // Changed key
        let mut single_a = FactorGraph::new();
        single_a.push(SymbolicFactor::shared(&[0]));
        let mut single_b = FactorGraph::new();
        single_b.push(SymbolicFactor::shared(&[1]));
        let tree_a = EliminationTree::from_graph(&single_a, &Ordering::from(vec![0])).unwrap();
        let tree_b = EliminationTree::from_graph(&single_b, &Ordering::from(vec![1])).unwrap();
        assert!(!tree_a.equals(&tree_b, 1e-9));

        // Same shape, differing factor
        let mut single_c = FactorGraph::new();
        single_c.push(SymbolicFactor::shared(&[0, 9]));
        let tree_c = EliminationTree::from_graph(&single_c, &Ordering::from(vec![0])).unwrap();
        assert!(!tree_a.equals(&tree_c, 1e-9));
    }

    #[test]
    fn test_swap() {
        let graph = chain_graph();
        let mut tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();
        let mut empty = EliminationTree::default();

        tree.swap(&mut empty);
        assert!(tree.roots().is_empty());
        assert_eq!(empty.roots(), &[2]);
    }

    #[test]
    fn test_write_forest() {
        let graph = chain_graph();
        let tree = EliminationTree::from_graph(&graph, &Ordering::from(vec![0, 1, 2])).unwrap();

        let mut rendered = String::new();
        tree.write_forest(&mut rendered).unwrap();
        assert!(rendered.starts_with("(2)"));
        assert!(rendered.contains("(0)"));
    }
}
