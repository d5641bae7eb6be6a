// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Diagonal round schedule over the partition grid.
//!
//! An epoch over a `k × k` grid runs in `k` rounds. In round `u`, user block
//! `a` is paired with item block `(u + a) mod k`. Within one round the user
//! blocks are distinct and so are the item blocks, so the active cells touch
//! disjoint factor rows. Over the `k` rounds every cell is visited once.
use rayon::ThreadPool;

use crate::errors::TrainingError;
use crate::parallel::run_tasks;
use crate::types::BlockId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundScheduler {
    num_blocks: usize,
}

impl RoundScheduler {
    pub fn new(num_blocks: usize) -> Self {
        assert!(num_blocks > 0, "schedule needs at least one block");
        RoundScheduler { num_blocks }
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Number of rounds in one epoch.
    pub fn num_rounds(&self) -> usize {
        self.num_blocks
    }

    /// Item block paired with `user_block` in `round`.
    #[inline]
    pub fn item_block(&self, round: usize, user_block: BlockId) -> BlockId {
        (round + user_block) % self.num_blocks
    }

    /// The `(user block, item block)` cells active in a round, by user block.
    pub fn round_cells(&self, round: usize) -> impl Iterator<Item = (BlockId, BlockId)> + '_ {
        (0..self.num_blocks).map(move |a| (a, self.item_block(round, a)))
    }

    /// Run one round's cell tasks on the pool and wait for all of them.
    ///
    /// A panicking task fails the round with [TrainingError::WorkerPanicked].
    pub fn run_round<T, R, F>(
        &self,
        pool: &ThreadPool,
        epoch: usize,
        round: usize,
        tasks: Vec<T>,
        work: F,
    ) -> Result<Vec<R>, TrainingError>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        debug_assert!(tasks.len() <= self.num_blocks);
        run_tasks(pool, tasks, work).map_err(|message| TrainingError::WorkerPanicked {
            epoch,
            round,
            message,
        })
    }
}
