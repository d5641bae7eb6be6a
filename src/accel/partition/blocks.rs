// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Block assignments derived from permutations.
use crate::types::{BlockId, ItemId};

use super::Permutation;

/// Compute the block for a 0-based rank.
///
/// Blocks are contiguous rank ranges whose sizes differ by at most one. The
/// product is taken before dividing so the boundary rank never rounds up into
/// a nonexistent block; the clamp only matters for out-of-range ranks.
#[inline]
pub fn block_of_rank(rank: usize, num_entities: usize, num_blocks: usize) -> BlockId {
    debug_assert!(num_blocks > 0);
    ((num_blocks * rank) / num_entities.max(1)).min(num_blocks - 1)
}

/// The block of every entity for one epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockAssignment {
    blocks: Vec<u32>,
    num_blocks: usize,
}

impl BlockAssignment {
    /// Assign blocks from a permutation. This is a pure function of its inputs.
    ///
    /// With more blocks than entities, some blocks stay empty.
    pub fn from_permutation(perm: &Permutation, num_blocks: usize) -> Self {
        assert!(num_blocks > 0, "at least one block is required");
        let n = perm.len();
        let blocks = perm
            .ranks()
            .iter()
            .map(|&r| block_of_rank(r as usize, n, num_blocks) as u32)
            .collect();
        BlockAssignment { blocks, num_blocks }
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Get the block of an entity.
    #[inline]
    pub fn block(&self, id: usize) -> BlockId {
        self.blocks[id] as BlockId
    }

    pub fn block_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_blocks];
        for &b in &self.blocks {
            sizes[b as usize] += 1;
        }
        sizes
    }

    /// Number of blocks with no entities.
    pub fn empty_blocks(&self) -> usize {
        self.block_sizes().iter().filter(|s| **s == 0).count()
    }

    /// Entity IDs of each block, in ascending ID order.
    pub fn members(&self) -> Vec<Vec<u32>> {
        let mut members = vec![Vec::new(); self.num_blocks];
        for (id, &b) in self.blocks.iter().enumerate() {
            members[b as usize].push(id as u32);
        }
        members
    }
}

/// Items available for negative sampling in each item block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemChunks {
    chunks: Vec<Vec<ItemId>>,
}

impl ItemChunks {
    pub fn from_assignment(items: &BlockAssignment) -> Self {
        ItemChunks {
            chunks: items.members(),
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.chunks.len()
    }

    /// Get the items of a block, in ascending ID order.
    pub fn chunk(&self, block: BlockId) -> &[ItemId] {
        &self.chunks[block]
    }
}
