// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Exclusive per-block access to factor matrix rows.
//!
//! A factor matrix is split into one [BlockRowsMut] handle per block. Every
//! handle comes from the same exclusive borrow of the matrix and can only
//! reach rows its block owns, so handles for different blocks never alias and
//! can be moved to different threads. Handles are re-split every round.
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

use ndarray::ArrayViewMut2;

use crate::errors::TrainingError;
use crate::types::BlockId;

use super::BlockAssignment;

/// Mutable access to the rows of one block of a factor matrix.
pub struct BlockRowsMut<'a> {
    data: NonNull<f32>,
    n_cols: usize,
    block: BlockId,
    assignment: &'a BlockAssignment,
    _borrow: PhantomData<&'a mut [f32]>,
}

// SAFETY: a handle only dereferences rows assigned to its own block, and each
// block gets exactly one handle per split, so no two threads can reach the
// same row.
unsafe impl Send for BlockRowsMut<'_> {}

impl<'a> BlockRowsMut<'a> {
    /// Split a matrix into one handle per block of `assignment`, in block order.
    pub fn split(
        matrix: ArrayViewMut2<'a, f32>,
        assignment: &'a BlockAssignment,
    ) -> Result<Vec<BlockRowsMut<'a>>, TrainingError> {
        let (n_rows, n_cols) = matrix.dim();
        assert_eq!(
            n_rows,
            assignment.len(),
            "block assignment does not cover the matrix"
        );
        let data = matrix.into_slice().ok_or(TrainingError::MatrixLayout)?;
        let data = NonNull::new(data.as_mut_ptr()).unwrap_or(NonNull::dangling());

        Ok((0..assignment.num_blocks())
            .map(|block| BlockRowsMut {
                data,
                n_cols,
                block,
                assignment,
                _borrow: PhantomData,
            })
            .collect())
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Query whether this handle owns a row.
    pub fn owns(&self, row: usize) -> bool {
        row < self.assignment.len() && self.assignment.block(row) == self.block
    }

    fn checked_row(&self, row: usize) -> *mut f32 {
        assert!(
            self.owns(row),
            "row {} is not in block {}",
            row,
            self.block
        );
        // SAFETY: `row` is in bounds (checked by `owns`), so the offset stays
        // inside the matrix allocation.
        unsafe { self.data.as_ptr().add(row * self.n_cols) }
    }

    /// Get one row. Panics if the row belongs to another block.
    pub fn row_mut(&mut self, row: u32) -> &mut [f32] {
        let ptr = self.checked_row(row as usize);
        // SAFETY: the row is owned by this handle and the returned slice
        // borrows the handle mutably.
        unsafe { slice::from_raw_parts_mut(ptr, self.n_cols) }
    }

    /// Get two distinct rows. Panics if they coincide or either belongs to
    /// another block.
    pub fn row_pair_mut(&mut self, first: u32, second: u32) -> (&mut [f32], &mut [f32]) {
        assert_ne!(first, second, "row pair must be distinct");
        let p1 = self.checked_row(first as usize);
        let p2 = self.checked_row(second as usize);
        // SAFETY: both rows are owned by this handle and do not overlap.
        unsafe {
            (
                slice::from_raw_parts_mut(p1, self.n_cols),
                slice::from_raw_parts_mut(p2, self.n_cols),
            )
        }
    }
}
