// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-user sets of observed items.
use rustc_hash::FxHashSet;

use crate::types::{ItemId, TrainingExample, UserId};

/// Items each user has interacted with.
///
/// Built once from the training corpus and read-only afterwards; shared by
/// reference across all workers.
#[derive(Clone, Debug, Default)]
pub struct UserHistory {
    items: Vec<FxHashSet<ItemId>>,
}

impl UserHistory {
    /// Build histories for `num_users` users from a corpus. Users without
    /// examples get empty histories.
    pub fn from_examples(num_users: usize, examples: &[TrainingExample]) -> Self {
        let mut items = vec![FxHashSet::default(); num_users];
        for ex in examples {
            let user = ex.user as usize;
            if user >= items.len() {
                items.resize_with(user + 1, FxHashSet::default);
            }
            items[user].insert(ex.item);
        }
        UserHistory { items }
    }

    pub fn num_users(&self) -> usize {
        self.items.len()
    }

    /// Query whether `user` has interacted with `item`.
    pub fn contains(&self, user: UserId, item: ItemId) -> bool {
        self.items
            .get(user as usize)
            .map(|set| set.contains(&item))
            .unwrap_or(false)
    }

    /// Get the set of items for a user, if the user is known.
    pub fn items(&self, user: UserId) -> Option<&FxHashSet<ItemId>> {
        self.items.get(user as usize)
    }

    /// Number of distinct items for a user.
    pub fn len(&self, user: UserId) -> usize {
        self.items(user).map(FxHashSet::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let examples: Vec<TrainingExample> = vec![(0, 1).into(), (0, 2).into(), (2, 1).into()];
        let hist = UserHistory::from_examples(3, &examples);
        assert_eq!(hist.num_users(), 3);
        assert!(hist.contains(0, 1));
        assert!(hist.contains(0, 2));
        assert!(!hist.contains(0, 0));
        assert!(hist.contains(2, 1));
        assert_eq!(hist.len(1), 0);
    }

    #[test]
    fn test_duplicates_collapse() {
        let examples: Vec<TrainingExample> = vec![(0, 1).into(), (0, 1).into(), (0, 1).into()];
        let hist = UserHistory::from_examples(1, &examples);
        assert_eq!(hist.len(0), 1);
    }

    #[test]
    fn test_unknown_user() {
        let hist = UserHistory::from_examples(2, &[]);
        assert!(!hist.contains(5, 0));
        assert!(hist.items(5).is_none());
    }
}
