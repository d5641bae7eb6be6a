// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Bucketing training examples by (user block, item block).
use crate::types::{BlockId, TrainingExample};

use super::BlockAssignment;

/// A `k × k` grid of training example cells for one epoch.
///
/// Cell `(a, b)` holds every example whose user is in block `a` and whose item
/// is in block `b`, in corpus order. Every example lands in exactly one cell.
#[derive(Clone, Debug)]
pub struct PartitionGrid {
    num_blocks: usize,
    cells: Vec<Vec<TrainingExample>>,
}

impl PartitionGrid {
    /// Partition a corpus in a single pass.
    ///
    /// Panics if an example refers to an entity the assignments do not cover.
    pub fn build(
        examples: &[TrainingExample],
        users: &BlockAssignment,
        items: &BlockAssignment,
    ) -> Self {
        assert_eq!(
            users.num_blocks(),
            items.num_blocks(),
            "user and item block counts differ"
        );
        let k = users.num_blocks();
        let mut cells = vec![Vec::new(); k * k];
        for ex in examples {
            let a = users.block(ex.user as usize);
            let b = items.block(ex.item as usize);
            cells[a * k + b].push(*ex);
        }
        PartitionGrid {
            num_blocks: k,
            cells,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Get the examples of cell `(user_block, item_block)`.
    pub fn cell(&self, user_block: BlockId, item_block: BlockId) -> &[TrainingExample] {
        assert!(user_block < self.num_blocks && item_block < self.num_blocks);
        &self.cells[user_block * self.num_blocks + item_block]
    }

    /// Total number of examples across all cells.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    /// Sizes of the largest and smallest cells.
    pub fn cell_size_range(&self) -> (usize, usize) {
        let min = self.cells.iter().map(Vec::len).min().unwrap_or(0);
        let max = self.cells.iter().map(Vec::len).max().unwrap_or(0);
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    use super::*;
    use crate::partition::Permutation;

    fn random_corpus(rng: &mut Pcg64, n: usize, nu: u32, ni: u32) -> Vec<TrainingExample> {
        (0..n)
            .map(|_| TrainingExample::new(rng.random_range(0..nu), rng.random_range(0..ni)))
            .collect()
    }

    #[test]
    fn test_grid_is_partition() {
        let mut rng = Pcg64::seed_from_u64(30);
        let corpus = random_corpus(&mut rng, 2000, 37, 53);
        for epoch in 0..5 {
            let k = epoch + 1;
            let users = BlockAssignment::from_permutation(&Permutation::shuffled(37, &mut rng), k);
            let items = BlockAssignment::from_permutation(&Permutation::shuffled(53, &mut rng), k);
            let grid = PartitionGrid::build(&corpus, &users, &items);
            assert_eq!(grid.len(), corpus.len());

            let mut union = Vec::new();
            for a in 0..k {
                for b in 0..k {
                    for ex in grid.cell(a, b) {
                        assert_eq!(users.block(ex.user as usize), a);
                        assert_eq!(items.block(ex.item as usize), b);
                        union.push(*ex);
                    }
                }
            }
            let mut expected = corpus.clone();
            expected.sort();
            union.sort();
            assert_eq!(union, expected);
        }
    }

    #[test]
    fn test_single_cell() {
        let corpus: Vec<TrainingExample> = vec![(0, 0).into(), (0, 1).into(), (1, 2).into()];
        let users = BlockAssignment::from_permutation(&Permutation::identity(2), 1);
        let items = BlockAssignment::from_permutation(&Permutation::identity(3), 1);
        let grid = PartitionGrid::build(&corpus, &users, &items);
        assert_eq!(grid.num_blocks(), 1);
        assert_eq!(grid.cell(0, 0), corpus.as_slice());
    }

    #[test]
    fn test_duplicates_kept() {
        let corpus: Vec<TrainingExample> = vec![(1, 1).into(); 4];
        let users = BlockAssignment::from_permutation(&Permutation::identity(2), 2);
        let items = BlockAssignment::from_permutation(&Permutation::identity(2), 2);
        let grid = PartitionGrid::build(&corpus, &users, &items);
        assert_eq!(grid.cell(1, 1).len(), 4);
        assert_eq!(grid.cell_size_range(), (0, 4));
    }

    #[test]
    fn test_empty_corpus() {
        let users = BlockAssignment::from_permutation(&Permutation::identity(4), 2);
        let items = BlockAssignment::from_permutation(&Permutation::identity(4), 2);
        let grid = PartitionGrid::build(&[], &users, &items);
        assert!(grid.is_empty());
    }
}
