//! Per-variable vector storage
//!
//! [`VectorValues`] maps small integer variable indices to dense vectors of
//! independently chosen dimension. It is the delta/gradient container of the
//! elimination pipeline: slot `j` holds the vector for variable `j`.
//!
//! A slot is always present once the container has been resized that far; a
//! logically absent variable is represented by a zero-length vector, never by
//! a missing slot.

use crate::linalg::{LinAlgError, LinAlgResult};
use nalgebra::DVector;
use std::ops::{Index, IndexMut};

/// Vector storage indexed by variable, with per-slot dimensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorValues {
    values: Vec<DVector<f64>>,
}

impl VectorValues {
    /// Creates a new, empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// A container with `n_vars` slots of dimension `var_dim`, all zero
    pub fn zero(n_vars: usize, var_dim: usize) -> Self {
        Self {
            values: (0..n_vars).map(|_| DVector::zeros(var_dim)).collect(),
        }
    }

    /// A container with the same structure as `x` and every slot zeroed
    pub fn zero_like(x: &Self) -> Self {
        Self {
            values: x.values.iter().map(|v| DVector::zeros(v.len())).collect(),
        }
    }

    /// A container with the same structure as `other`, contents unspecified
    /// (zeroed) pending assignment
    pub fn same_structure(other: &Self) -> Self {
        let mut result = Self::new();
        result.resize_like(other);
        result
    }

    /// Number of variable slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the container holds no slots
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dimension of the vector in slot `j`
    pub fn dim(&self, j: usize) -> usize {
        self.values[j].len()
    }

    /// Per-slot dimensions, in slot order
    pub fn dims(&self) -> Vec<usize> {
        self.values.iter().map(|v| v.len()).collect()
    }

    /// Insert a vector at slot `j`, growing the container if needed
    ///
    /// Existence is coarse: any `j` below the current slot count counts as
    /// already existing, even if that slot was only implicitly zero-filled by
    /// a previous growth. Growing zero-fills intermediate slots with empty
    /// (zero-length) vectors.
    pub fn insert(&mut self, j: usize, value: DVector<f64>) -> LinAlgResult<()> {
        if j < self.values.len() {
            return Err(LinAlgError::DuplicateKey(j));
        }
        self.values.resize_with(j + 1, || DVector::zeros(0));
        self.values[j] = value;
        Ok(())
    }

    /// Replace all slots with `n_vars` zeroed vectors of dimension `var_dim`
    pub fn resize(&mut self, n_vars: usize, var_dim: usize) {
        self.values = (0..n_vars).map(|_| DVector::zeros(var_dim)).collect();
    }

    /// Replace all slots so per-slot dimensions mirror `other`, contents reset
    pub fn resize_like(&mut self, other: &Self) {
        self.values = other
            .values
            .iter()
            .map(|v| DVector::zeros(v.len()))
            .collect();
    }

    /// True iff same slot count and identical per-slot dimensions
    pub fn has_same_structure(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a.len() == b.len())
    }

    /// Set every slot to zero, preserving structure
    pub fn set_zero(&mut self) {
        for v in &mut self.values {
            v.fill(0.0);
        }
    }

    /// Elementwise sum; fails on structural mismatch
    pub fn add(&self, other: &Self) -> LinAlgResult<Self> {
        let mut result = Self::same_structure(self);
        self.check_counts(other, "add")?;
        for j in 0..self.values.len() {
            self.check_slot(other, j, "add")?;
            result.values[j] = &self.values[j] + &other.values[j];
        }
        Ok(result)
    }

    /// Elementwise difference; fails on structural mismatch
    pub fn sub(&self, other: &Self) -> LinAlgResult<Self> {
        let mut result = Self::same_structure(self);
        self.check_counts(other, "sub")?;
        for j in 0..self.values.len() {
            self.check_slot(other, j, "sub")?;
            result.values[j] = &self.values[j] - &other.values[j];
        }
        Ok(result)
    }

    /// In-place elementwise sum; fails on structural mismatch
    pub fn add_in_place(&mut self, other: &Self) -> LinAlgResult<()> {
        self.check_counts(other, "add_in_place")?;
        for j in 0..self.values.len() {
            self.check_slot(other, j, "add_in_place")?;
        }
        for j in 0..self.values.len() {
            self.values[j] += &other.values[j];
        }
        Ok(())
    }

    /// Accumulated elementwise dot product across slots
    pub fn dot(&self, other: &Self) -> LinAlgResult<f64> {
        self.check_counts(other, "dot")?;
        let mut result = 0.0;
        for j in 0..self.values.len() {
            self.check_slot(other, j, "dot")?;
            result += self.values[j].dot(&other.values[j]);
        }
        Ok(result)
    }

    /// Euclidean norm of the concatenation of all slots
    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// Sum of per-slot squared norms
    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v.norm_squared()).sum()
    }

    /// Concatenation of all slots in slot order
    pub fn as_vector(&self) -> DVector<f64> {
        let total: usize = self.values.iter().map(|v| v.len()).sum();
        let mut result = DVector::zeros(total);
        let mut offset = 0;
        for v in &self.values {
            result.rows_mut(offset, v.len()).copy_from(v);
            offset += v.len();
        }
        result
    }

    /// Concatenation restricted to `indices`, in the given order
    ///
    /// Duplicates and arbitrary order are allowed.
    pub fn vector_subset(&self, indices: &[usize]) -> LinAlgResult<DVector<f64>> {
        let mut total = 0;
        for &j in indices {
            let v = self
                .values
                .get(j)
                .ok_or(LinAlgError::IndexOutOfRange {
                    index: j,
                    size: self.values.len(),
                })?;
            total += v.len();
        }
        let mut result = DVector::zeros(total);
        let mut offset = 0;
        for &j in indices {
            let v = &self.values[j];
            result.rows_mut(offset, v.len()).copy_from(v);
            offset += v.len();
        }
        Ok(result)
    }

    /// Approximate equality: same structure and per-slot componentwise
    /// agreement within `tol`
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        self.values.iter().zip(other.values.iter()).all(|(a, b)| {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
        })
    }

    /// Swap contents with `other` in constant time
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.values, &mut other.values);
    }

    /// Iterate over slots in slot order
    pub fn iter(&self) -> std::slice::Iter<'_, DVector<f64>> {
        self.values.iter()
    }

    fn check_counts(&self, other: &Self, op: &str) -> LinAlgResult<()> {
        if self.values.len() != other.values.len() {
            return Err(LinAlgError::SizeMismatch(format!(
                "VectorValues::{op} called with different slot counts ({} vs {})",
                self.values.len(),
                other.values.len()
            )));
        }
        Ok(())
    }

    fn check_slot(&self, other: &Self, j: usize, op: &str) -> LinAlgResult<()> {
        if self.values[j].len() != other.values[j].len() {
            return Err(LinAlgError::SizeMismatch(format!(
                "VectorValues::{op} called with different dimensions at slot {j} ({} vs {})",
                self.values[j].len(),
                other.values[j].len()
            )));
        }
        Ok(())
    }
}

impl Index<usize> for VectorValues {
    type Output = DVector<f64>;

    fn index(&self, j: usize) -> &Self::Output {
        &self.values[j]
    }
}

impl IndexMut<usize> for VectorValues {
    fn index_mut(&mut self, j: usize) -> &mut Self::Output {
        &mut self.values[j]
    }
}

impl<'a> IntoIterator for &'a VectorValues {
    type Item = &'a DVector<f64>;
    type IntoIter = std::slice::Iter<'a, DVector<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
