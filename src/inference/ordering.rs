//! Elimination ordering
//!
//! An [`Ordering`] is the externally supplied sequence of variables to
//! eliminate, one entry per elimination step. It may cover a strict subset
//! of the graph's variables (partial elimination). Ordering heuristics live
//! outside this crate; here the sequence is just consumed.

use crate::core::Key;
use std::ops::Index;

/// A sequence of variable keys defining the elimination order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    keys: Vec<Key>,
}

impl Ordering {
    /// Creates an ordering from a key sequence
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    /// Number of elimination steps
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the ordering is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check if `key` appears in the ordering
    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// The keys in elimination order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Iterate over keys in elimination order
    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.keys.iter()
    }
}

impl Index<usize> for Ordering {
    type Output = Key;

    fn index(&self, j: usize) -> &Self::Output {
        &self.keys[j]
    }
}

impl From<Vec<Key>> for Ordering {
    fn from(keys: Vec<Key>) -> Self {
        Self::new(keys)
    }
}

impl FromIterator<Key> for Ordering {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ordering {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
