// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Core identifier and record types.
use serde::{Deserialize, Serialize};

/// Alias for user indices.
pub type UserId = u32;
/// Alias for item indices.
pub type ItemId = u32;
/// Alias for block indices (0-based).
pub type BlockId = usize;

/// An observed positive (implicit-feedback) interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrainingExample {
    pub user: UserId,
    pub item: ItemId,
}

impl TrainingExample {
    pub fn new(user: UserId, item: ItemId) -> Self {
        TrainingExample { user, item }
    }
}

impl From<(UserId, ItemId)> for TrainingExample {
    fn from((user, item): (UserId, ItemId)) -> Self {
        TrainingExample { user, item }
    }
}
