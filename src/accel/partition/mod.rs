// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-epoch randomized partitioning of users, items and examples.
mod blocks;
mod grid;
mod permutation;
mod rows;

pub use blocks::{block_of_rank, BlockAssignment, ItemChunks};
pub use grid::PartitionGrid;
pub use permutation::Permutation;
pub use rows::BlockRowsMut;
