// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Random rank assignments for users and items.
use rand::seq::SliceRandom;
use rand::Rng;

/// A bijection from entity IDs to ranks, stored as `ranks[id]` in `0..n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    ranks: Vec<u32>,
}

impl Permutation {
    /// The identity permutation.
    pub fn identity(n: usize) -> Self {
        Permutation {
            ranks: (0..n as u32).collect(),
        }
    }

    /// Draw a uniformly random permutation of `n` entities (Fisher-Yates).
    pub fn shuffled<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut perm = Self::identity(n);
        perm.ranks.shuffle(rng);
        perm
    }

    /// Build a permutation from explicit ranks.
    ///
    /// Returns `None` if `ranks` is not a permutation of `0..ranks.len()`.
    pub fn from_ranks(ranks: Vec<u32>) -> Option<Self> {
        let mut seen = vec![false; ranks.len()];
        for &r in &ranks {
            let slot = seen.get_mut(r as usize)?;
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Permutation { ranks })
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Get the rank of an entity.
    pub fn rank(&self, id: usize) -> usize {
        self.ranks[id] as usize
    }

    pub fn ranks(&self) -> &[u32] {
        &self.ranks
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    fn is_permutation(p: &Permutation) -> bool {
        let mut sorted = p.ranks().to_vec();
        sorted.sort_unstable();
        sorted.into_iter().enumerate().all(|(i, r)| i == r as usize)
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let mut rng = Pcg64::seed_from_u64(1);
        for n in [0, 1, 2, 17, 1000] {
            let p = Permutation::shuffled(n, &mut rng);
            assert_eq!(p.len(), n);
            assert!(is_permutation(&p));
        }
    }

    #[test]
    fn test_shuffle_varies() {
        let mut rng = Pcg64::seed_from_u64(2);
        let a = Permutation::shuffled(100, &mut rng);
        let b = Permutation::shuffled(100, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shuffle_roughly_uniform() {
        // each entity should land in each rank about equally often
        let mut rng = Pcg64::seed_from_u64(3);
        let n = 4;
        let trials = 8000;
        let mut counts = [[0usize; 4]; 4];
        for _ in 0..trials {
            let p = Permutation::shuffled(n, &mut rng);
            for id in 0..n {
                counts[id][p.rank(id)] += 1;
            }
        }
        for row in counts {
            for c in row {
                assert!(c > 1700 && c < 2300, "count {} out of range", c);
            }
        }
    }

    #[test]
    fn test_from_ranks() {
        assert!(Permutation::from_ranks(vec![2, 0, 1]).is_some());
        assert!(Permutation::from_ranks(vec![0, 0, 1]).is_none());
        assert!(Permutation::from_ranks(vec![0, 3, 1]).is_none());
    }
}
