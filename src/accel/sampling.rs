// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Negative item sampling with history rejection.
use std::ops::Range;

use rand::Rng;

use crate::data::UserHistory;
use crate::types::{ItemId, UserId};

/// Number of candidates drawn before an example is dropped.
pub const MAX_NEGATIVE_ATTEMPTS: usize = 10;

/// A set of items negatives may be drawn from.
pub trait CandidatePool {
    /// Number of candidates in the pool.
    fn pool_size(&self) -> usize;
    /// Get the candidate at a position in `0..pool_size()`.
    fn candidate(&self, index: usize) -> ItemId;
}

/// Item lists, such as the items of one block.
impl CandidatePool for [ItemId] {
    fn pool_size(&self) -> usize {
        self.len()
    }

    fn candidate(&self, index: usize) -> ItemId {
        self[index]
    }
}

/// Contiguous ID ranges, such as the whole item universe.
impl CandidatePool for Range<ItemId> {
    fn pool_size(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    fn candidate(&self, index: usize) -> ItemId {
        self.start + index as ItemId
    }
}

/// Sample a negative item for `user` uniformly from `pool`.
///
/// Candidates in the user's history are rejected. After
/// [MAX_NEGATIVE_ATTEMPTS] rejections (or for an empty pool) this returns
/// `None`, and the caller skips the example.
pub fn sample_negative<R, P>(
    rng: &mut R,
    pool: &P,
    history: &UserHistory,
    user: UserId,
) -> Option<ItemId>
where
    R: Rng + ?Sized,
    P: CandidatePool + ?Sized,
{
    let n = pool.pool_size();
    if n == 0 {
        return None;
    }

    let seen = history.items(user);
    for _ in 0..MAX_NEGATIVE_ATTEMPTS {
        let item = pool.candidate(rng.random_range(0..n));
        if !seen.map(|s| s.contains(&item)).unwrap_or(false) {
            return Some(item);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::types::TrainingExample;

    fn synthetic_history() -> UserHistory {
        // user 0 has seen every even item below 50
        let examples: Vec<TrainingExample> =
            (0..50).step_by(2).map(|i| TrainingExample::new(0, i)).collect();
        UserHistory::from_examples(1, &examples)
    }

    #[test]
    fn test_never_returns_history() {
        let hist = synthetic_history();
        let mut rng = Pcg64::seed_from_u64(20);
        let pool: Range<ItemId> = 0..60;
        let mut drawn = 0;
        for _ in 0..5000 {
            if let Some(item) = sample_negative(&mut rng, &pool, &hist, 0) {
                assert!(!hist.contains(0, item));
                assert!(item < 60);
                drawn += 1;
            }
        }
        // rejection probability per draw is 25/60, ten in a row is vanishingly rare
        assert!(drawn > 4900);
    }

    #[test]
    fn test_block_restricted() {
        let hist = synthetic_history();
        let mut rng = Pcg64::seed_from_u64(21);
        let block: Vec<ItemId> = vec![3, 4, 7, 10, 51];
        for _ in 0..1000 {
            if let Some(item) = sample_negative(&mut rng, block.as_slice(), &hist, 0) {
                assert!([3, 7, 51].contains(&item));
            }
        }
    }

    #[test]
    fn test_exhausted() {
        let hist = synthetic_history();
        let mut rng = Pcg64::seed_from_u64(22);
        let block: Vec<ItemId> = vec![0, 2, 4];
        for _ in 0..100 {
            assert_eq!(sample_negative(&mut rng, block.as_slice(), &hist, 0), None);
        }
    }

    #[test]
    fn test_empty_pool() {
        let hist = synthetic_history();
        let mut rng = Pcg64::seed_from_u64(23);
        let block: Vec<ItemId> = Vec::new();
        assert_eq!(sample_negative(&mut rng, block.as_slice(), &hist, 0), None);
        assert_eq!(sample_negative(&mut rng, &(5u32..5), &hist, 0), None);
    }

    #[test]
    fn test_unknown_user_accepts_first() {
        let hist = synthetic_history();
        let mut a = Pcg64::seed_from_u64(24);
        let mut b = Pcg64::seed_from_u64(24);
        let item = sample_negative(&mut a, &(0u32..10), &hist, 9).unwrap();
        let expected = b.random_range(0..10usize) as ItemId;
        assert_eq!(item, expected);
    }

    #[test]
    fn test_range_and_slice_agree() {
        // the full item list in ID order draws the same items as the ID range
        let hist = synthetic_history();
        let all: Vec<ItemId> = (0..30).collect();
        let mut a = Pcg64::seed_from_u64(25);
        let mut b = Pcg64::seed_from_u64(25);
        for _ in 0..200 {
            assert_eq!(
                sample_negative(&mut a, &(0u32..30), &hist, 0),
                sample_negative(&mut b, all.as_slice(), &hist, 0)
            );
        }
    }
}
