// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-cell SGD loop.
use rand_pcg::Pcg64;

use crate::data::UserHistory;
use crate::errors::TrainingError;
use crate::model::UpdateRule;
use crate::partition::BlockRowsMut;
use crate::progress::ProgressHandle;
use crate::sampling::sample_negative;
use crate::types::{ItemId, TrainingExample};

use super::{CancelToken, EpochStats, CANCEL_CHECK_INTERVAL};

/// Trains on the examples of one grid cell `(a, b)`.
///
/// The worker holds the rows of user block `a` and item block `b`, and
/// samples negatives only from block `b`, so it never touches a row
/// outside its cell.
pub struct CellWorker<'a> {
    pub(crate) user_rows: BlockRowsMut<'a>,
    pub(crate) item_rows: BlockRowsMut<'a>,
    pub(crate) examples: &'a [TrainingExample],
    pub(crate) candidates: &'a [ItemId],
    pub(crate) history: &'a UserHistory,
    pub(crate) rule: UpdateRule,
    pub(crate) rng: Pcg64,
    pub(crate) cancel: &'a CancelToken,
    pub(crate) progress: &'a ProgressHandle,
}

impl CellWorker<'_> {
    /// Process every example of the cell once, in order.
    pub fn run(mut self, epoch: usize) -> Result<EpochStats, TrainingError> {
        let mut stats = EpochStats::default();
        let mut since_check = 0;

        for ex in self.examples {
            if since_check == CANCEL_CHECK_INTERVAL {
                if self.cancel.is_cancelled() {
                    return Err(TrainingError::Interrupted { epoch });
                }
                self.progress.advance(since_check);
                since_check = 0;
            }
            since_check += 1;

            let Some(neg) = sample_negative(&mut self.rng, self.candidates, self.history, ex.user)
            else {
                stats.skipped += 1;
                continue;
            };

            let user = self.user_rows.row_mut(ex.user);
            let (pos, neg) = self.item_rows.row_pair_mut(ex.item, neg);
            self.rule.apply(user, pos, neg);
            stats.updates += 1;
        }

        self.progress.advance(since_check);
        Ok(stats)
    }
}
