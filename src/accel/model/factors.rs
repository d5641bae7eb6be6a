// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Dense user and item factor matrices.
use ndarray::{s, Array2, ArrayView1, ArrayView2, ArrayViewMut2};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::errors::ConfigError;
use crate::types::{ItemId, UserId};

use super::update::{dot, UpdateRule};

/// User (`P`) and item (`Q`) latent factor matrices.
///
/// Both matrices are kept in standard (row-major) layout, so each row is one
/// contiguous slice; rows are the unit of concurrent access during training.
#[derive(Clone, Debug, PartialEq)]
pub struct LatentFactorModel {
    users: Array2<f32>,
    items: Array2<f32>,
}

impl LatentFactorModel {
    /// Initialize both matrices from `N(mu, sigma²)`.
    pub fn gaussian<R: Rng>(
        num_users: usize,
        num_items: usize,
        num_factors: usize,
        mu: f64,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let normal = Normal::new(mu, sigma)
            .map_err(|e| ConfigError::invalid("sigma", format!("{}", e)))?;
        let users = Array2::from_shape_simple_fn((num_users, num_factors), || {
            normal.sample(rng) as f32
        });
        let items = Array2::from_shape_simple_fn((num_items, num_factors), || {
            normal.sample(rng) as f32
        });
        Ok(LatentFactorModel { users, items })
    }

    /// Wrap existing factor matrices.
    pub fn from_matrices(users: Array2<f32>, items: Array2<f32>) -> Result<Self, ConfigError> {
        if users.ncols() != items.ncols() {
            return Err(ConfigError::invalid(
                "items",
                format!(
                    "item matrix has {} factors, user matrix has {}",
                    items.ncols(),
                    users.ncols()
                ),
            ));
        }
        Ok(LatentFactorModel {
            users: users.as_standard_layout().into_owned(),
            items: items.as_standard_layout().into_owned(),
        })
    }

    pub fn num_users(&self) -> usize {
        self.users.nrows()
    }

    pub fn num_items(&self) -> usize {
        self.items.nrows()
    }

    pub fn num_factors(&self) -> usize {
        self.users.ncols()
    }

    pub fn user_factors(&self) -> ArrayView2<'_, f32> {
        self.users.view()
    }

    pub fn item_factors(&self) -> ArrayView2<'_, f32> {
        self.items.view()
    }

    pub fn user_row(&self, user: UserId) -> ArrayView1<'_, f32> {
        self.users.row(user as usize)
    }

    pub fn item_row(&self, item: ItemId) -> ArrayView1<'_, f32> {
        self.items.row(item as usize)
    }

    /// Mutable views of both matrices at once.
    pub fn factors_mut(&mut self) -> (ArrayViewMut2<'_, f32>, ArrayViewMut2<'_, f32>) {
        (self.users.view_mut(), self.items.view_mut())
    }

    pub fn into_parts(self) -> (Array2<f32>, Array2<f32>) {
        (self.users, self.items)
    }

    /// Predicted preference score `P[user] · Q[item]`.
    pub fn score(&self, user: UserId, item: ItemId) -> f32 {
        let u = self.users.row(user as usize);
        let i = self.items.row(item as usize);
        match (u.as_slice(), i.as_slice()) {
            (Some(u), Some(i)) => dot(u, i),
            _ => u.dot(&i),
        }
    }

    /// Apply one BPR step to the rows of `user`, `pos_item` and `neg_item`.
    ///
    /// The two items must differ. Negatives drawn by [crate::sampling] never
    /// coincide with the positive, since the positive is in the user's history;
    /// this is only checked in debug builds.
    pub(crate) fn update(
        &mut self,
        rule: &UpdateRule,
        user: UserId,
        pos_item: ItemId,
        neg_item: ItemId,
    ) {
        debug_assert_ne!(pos_item, neg_item, "positive and negative item coincide");
        let mut u_row = self.users.row_mut(user as usize);
        let (mut p_row, mut n_row) = self
            .items
            .multi_slice_mut((s![pos_item as usize, ..], s![neg_item as usize, ..]));
        // standard layout is maintained by every constructor
        let u = u_row.as_slice_mut().expect("user factors are contiguous");
        let p = p_row.as_slice_mut().expect("item factors are contiguous");
        let n = n_row.as_slice_mut().expect("item factors are contiguous");
        rule.apply(u, p, n);
    }
}
