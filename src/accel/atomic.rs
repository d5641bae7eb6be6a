// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Atomic utilities for lock-free shared factor matrices.
//!
//! The no-partition trainer lets every worker read and write every row.
//! Storing values as relaxed atomics keeps those races well-defined: a reader
//! may see a row that another worker is halfway through writing, but never a
//! torn float.

use std::sync::atomic::{AtomicU32, Ordering};

use ndarray::{Array2, ArrayView2};

/// An `f32` with relaxed atomic load and store.
#[repr(transparent)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        AtomicF32 {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed)
    }
}

/// A row-major matrix of [AtomicF32] shared between threads.
pub struct SharedMatrix {
    n_cols: usize,
    data: Vec<AtomicF32>,
}

impl SharedMatrix {
    pub fn from_array(src: ArrayView2<'_, f32>) -> Self {
        SharedMatrix {
            n_cols: src.ncols(),
            // iteration is in logical row-major order for any layout
            data: src.iter().map(|v| AtomicF32::new(*v)).collect(),
        }
    }

    pub fn n_rows(&self) -> usize {
        if self.n_cols == 0 {
            0
        } else {
            self.data.len() / self.n_cols
        }
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn row(&self, row: usize) -> &[AtomicF32] {
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Copy a row into `out`.
    pub fn load_row(&self, row: usize, out: &mut [f32]) {
        for (o, v) in out.iter_mut().zip(self.row(row)) {
            *o = v.load();
        }
    }

    /// Overwrite a row from `src`.
    pub fn store_row(&self, row: usize, src: &[f32]) {
        for (v, s) in self.row(row).iter().zip(src) {
            v.store(*s);
        }
    }

    /// Snapshot the matrix into an owned array.
    pub fn to_array(&self) -> Array2<f32> {
        let n_rows = self.n_rows();
        Array2::from_shape_fn((n_rows, self.n_cols), |(r, c)| {
            self.data[r * self.n_cols + c].load()
        })
    }
}
