//! Column-blocked dense matrix with an active view
//!
//! [`VerticalBlockMatrix`] owns one contiguous dense matrix logically
//! partitioned into column blocks, one block per variable. Stacked Jacobian
//! blocks live side by side without per-block allocation; an active
//! sub-range of rows and blocks presents a subset of the storage as "the"
//! matrix, which is how partial elimination peels off eliminated columns
//! without copying.

use nalgebra::{DMatrix, DMatrixView, DMatrixViewMut};

/// A dense matrix partitioned into contiguous column blocks
///
/// The active view is the rectangle `[row_start, row_end)` x blocks
/// `[block_start, n_total_blocks)`. All block-indexed accessors are relative
/// to the active view. Structural invariants are programming-error checked:
/// any violation panics rather than returning an error.
#[derive(Debug, Clone)]
pub struct VerticalBlockMatrix {
    matrix: DMatrix<f64>,
    /// Column offset of each block boundary; length = total blocks + 1
    variable_col_offsets: Vec<usize>,
    row_start: usize,
    row_end: usize,
    block_start: usize,
}

impl VerticalBlockMatrix {
    /// A zeroed matrix with the given per-block column counts and row count
    ///
    /// Panics if any block dimension is zero (offsets must stay strictly
    /// increasing).
    pub fn new(block_dims: &[usize], rows: usize) -> Self {
        let mut offsets = Vec::with_capacity(block_dims.len() + 1);
        offsets.push(0);
        let mut total = 0;
        for &dim in block_dims {
            total += dim;
            offsets.push(total);
        }
        let result = Self {
            matrix: DMatrix::zeros(rows, total),
            variable_col_offsets: offsets,
            row_start: 0,
            row_end: rows,
            block_start: 0,
        };
        result.assert_invariants();
        result
    }

    /// A fresh zeroed matrix mirroring the shape of `rhs`'s active view
    ///
    /// The block count equals `rhs`'s active block count, offsets are
    /// remapped to start at zero, and rows run up to `rhs`'s active row
    /// count. Only the shape is copied, never the data.
    pub fn like_active_view_of(rhs: &Self) -> Self {
        let n_blocks = rhs.n_blocks();
        let base = rhs.variable_col_offsets[rhs.block_start];
        let offsets: Vec<usize> = (0..=n_blocks)
            .map(|i| rhs.variable_col_offsets[rhs.block_start + i] - base)
            .collect();
        let rows = rhs.rows();
        let cols = offsets[n_blocks];
        let result = Self {
            matrix: DMatrix::zeros(rows, cols),
            variable_col_offsets: offsets,
            row_start: 0,
            row_end: rows,
            block_start: 0,
        };
        result.assert_invariants();
        result
    }

    /// Rows in the active view
    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Columns in the active view
    pub fn cols(&self) -> usize {
        self.variable_col_offsets[self.n_total_blocks()]
            - self.variable_col_offsets[self.block_start]
    }

    /// Blocks in the active view
    pub fn n_blocks(&self) -> usize {
        self.n_total_blocks() - self.block_start
    }

    /// Column offset of active block `i`, relative to the active view
    pub fn offset(&self, i: usize) -> usize {
        self.variable_col_offsets[self.block_start + i]
            - self.variable_col_offsets[self.block_start]
    }

    /// View of active block `i`
    pub fn block(&self, i: usize) -> DMatrixView<'_, f64> {
        self.range(i, i + 1)
    }

    /// Mutable view of active block `i`
    pub fn block_mut(&mut self, i: usize) -> DMatrixViewMut<'_, f64> {
        self.range_mut(i, i + 1)
    }

    /// View spanning active blocks `[i, j)`
    pub fn range(&self, i: usize, j: usize) -> DMatrixView<'_, f64> {
        let (col, width) = self.range_extent(i, j);
        self.matrix
            .view((self.row_start, col), (self.row_end - self.row_start, width))
    }

    /// Mutable view spanning active blocks `[i, j)`
    pub fn range_mut(&mut self, i: usize, j: usize) -> DMatrixViewMut<'_, f64> {
        let (col, width) = self.range_extent(i, j);
        self.matrix
            .view_mut((self.row_start, col), (self.row_end - self.row_start, width))
    }

    /// View of the whole active region
    pub fn full(&self) -> DMatrixView<'_, f64> {
        self.range(0, self.n_blocks())
    }

    /// Mutable view of the whole active region
    pub fn full_mut(&mut self) -> DMatrixViewMut<'_, f64> {
        self.range_mut(0, self.n_blocks())
    }

    /// First active row
    pub fn row_start(&self) -> usize {
        self.row_start
    }

    /// One past the last active row
    pub fn row_end(&self) -> usize {
        self.row_end
    }

    /// First active block
    pub fn first_block(&self) -> usize {
        self.block_start
    }

    /// Restrict the active rows to start at `row_start`
    pub fn set_row_start(&mut self, row_start: usize) {
        self.row_start = row_start;
        self.assert_invariants();
    }

    /// Restrict the active rows to end at `row_end`
    pub fn set_row_end(&mut self, row_end: usize) {
        self.row_end = row_end;
        self.assert_invariants();
    }

    /// Restrict the active blocks to start at `block_start`
    pub fn set_first_block(&mut self, block_start: usize) {
        self.block_start = block_start;
        self.assert_invariants();
    }

    /// Structural invariant check; panics on violation
    ///
    /// Must hold after construction and after every structural mutation.
    pub fn assert_invariants(&self) {
        assert!(
            !self.variable_col_offsets.is_empty() && self.variable_col_offsets[0] == 0,
            "VerticalBlockMatrix: block offsets must start at zero"
        );
        assert!(
            self.variable_col_offsets.windows(2).all(|w| w[0] < w[1]),
            "VerticalBlockMatrix: block offsets must be strictly increasing"
        );
        assert!(
            self.matrix.ncols() == *self.variable_col_offsets.last().unwrap_or(&0),
            "VerticalBlockMatrix: storage width must match the last block offset"
        );
        assert!(
            self.block_start <= self.n_total_blocks(),
            "VerticalBlockMatrix: active block range out of bounds"
        );
        assert!(
            self.row_start <= self.row_end && self.row_end <= self.matrix.nrows(),
            "VerticalBlockMatrix: active row range out of bounds"
        );
    }

    fn n_total_blocks(&self) -> usize {
        self.variable_col_offsets.len() - 1
    }

    fn range_extent(&self, i: usize, j: usize) -> (usize, usize) {
        assert!(
            i <= j && self.block_start + j <= self.n_total_blocks(),
            "VerticalBlockMatrix: block range out of bounds"
        );
        let col = self.variable_col_offsets[self.block_start + i];
        let width = self.variable_col_offsets[self.block_start + j] - col;
        (col, width)
    }
}
