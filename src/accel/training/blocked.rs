// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Conflict-free block-partitioned parallel BPR.
//!
//! Every epoch, users and items are shuffled into `k = num_procs` blocks and
//! the corpus is bucketed into a `k × k` grid. The epoch then runs `k` rounds
//! of the diagonal schedule; each round trains `k` cells in parallel whose
//! user blocks and item blocks are pairwise distinct, so no two workers ever
//! touch the same factor row. Rounds are separated by a barrier.
use log::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::config::{Algorithm, TrainingConfig};
use crate::errors::{ConfigError, TrainingError};
use crate::model::LatentFactorModel;
use crate::parallel::worker_pool;
use crate::partition::{BlockAssignment, BlockRowsMut, ItemChunks, PartitionGrid, Permutation};
use crate::progress::ProgressHandle;
use crate::schedule::RoundScheduler;
use crate::types::TrainingExample;

use super::{
    ranker_accessors, CellWorker, EpochStats, PairwiseRanker, TrainerState, TrainingSummary,
};

/// Block-partitioned parallel SGD trainer.
///
/// Training is reproducible under a fixed seed: all partitioning and worker
/// seeds come from the master RNG in a fixed order.
pub struct BlockPartitionedBpr {
    state: TrainerState,
}

impl BlockPartitionedBpr {
    pub fn new(config: TrainingConfig, num_users: usize, num_items: usize) -> Result<Self, ConfigError> {
        Ok(BlockPartitionedBpr {
            state: TrainerState::new(config, num_users, num_items)?,
        })
    }

    pub fn from_model(config: TrainingConfig, model: LatentFactorModel) -> Result<Self, ConfigError> {
        Ok(BlockPartitionedBpr {
            state: TrainerState::with_model(config, model)?,
        })
    }
}

impl PairwiseRanker for BlockPartitionedBpr {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BlockPartitioned
    }

    fn learn(
        &mut self,
        examples: &[TrainingExample],
        num_procs: usize,
    ) -> Result<TrainingSummary, TrainingError> {
        if num_procs == 0 {
            return Err(TrainingError::NoWorkers);
        }
        let history = self.state.prepare(examples)?;
        let state = &mut self.state;
        let num_users = state.model.num_users();
        let num_items = state.model.num_items();
        let n_epochs = state.config.num_epochs;

        if num_procs > num_users || num_procs > num_items {
            warn!(
                "{} workers for {} users and {} items, some blocks will be empty",
                num_procs, num_users, num_items
            );
        }

        let pool = worker_pool(num_procs)?;
        let scheduler = RoundScheduler::new(num_procs);
        let progress = ProgressHandle::new("block-partitioned BPR", Some(examples.len() * n_epochs));
        let mut summary = TrainingSummary::default();

        for epoch in 0..n_epochs {
            state.check_cancel(epoch)?;

            let user_perm = Permutation::shuffled(num_users, &mut state.rng);
            let item_perm = Permutation::shuffled(num_items, &mut state.rng);
            let user_blocks = BlockAssignment::from_permutation(&user_perm, num_procs);
            let item_blocks = BlockAssignment::from_permutation(&item_perm, num_procs);
            let chunks = ItemChunks::from_assignment(&item_blocks);
            let grid = PartitionGrid::build(examples, &user_blocks, &item_blocks);
            let (min_cell, max_cell) = grid.cell_size_range();
            debug!(
                "epoch {}: {} examples in {}x{} cells (sizes {}..{})",
                epoch,
                grid.len(),
                num_procs,
                num_procs,
                min_cell,
                max_cell
            );
            debug!(
                "epoch {}: user block sizes {:?}, item block sizes {:?}",
                epoch,
                user_blocks.block_sizes(),
                item_blocks.block_sizes()
            );
            let empty = user_blocks.empty_blocks() + item_blocks.empty_blocks();
            if empty > 0 {
                debug!("epoch {}: {} empty blocks", epoch, empty);
            }

            let mut stats = EpochStats::default();
            for round in 0..scheduler.num_rounds() {
                state.check_cancel(epoch)?;

                let seeds: Vec<u64> = (0..num_procs).map(|_| state.rng.random()).collect();
                let (user_mat, item_mat) = state.model.factors_mut();
                let user_rows = BlockRowsMut::split(user_mat, &user_blocks)?;
                let mut item_rows: Vec<Option<BlockRowsMut>> =
                    BlockRowsMut::split(item_mat, &item_blocks)?
                        .into_iter()
                        .map(Some)
                        .collect();

                let mut tasks = Vec::with_capacity(num_procs);
                for (user_rows, (a, b)) in user_rows.into_iter().zip(scheduler.round_cells(round)) {
                    let item_rows = item_rows[b]
                        .take()
                        .ok_or(TrainingError::ScheduleConflict { round, block: b })?;
                    tasks.push(CellWorker {
                        user_rows,
                        item_rows,
                        examples: grid.cell(a, b),
                        candidates: chunks.chunk(b),
                        history: &history,
                        rule: state.rule,
                        rng: Pcg64::seed_from_u64(seeds[a]),
                        cancel: &state.cancel,
                        progress: &progress,
                    });
                }

                let results = scheduler.run_round(&pool, epoch, round, tasks, |w| w.run(epoch))?;
                for res in results {
                    stats += res?;
                }
            }

            info!(
                "epoch {}: {} updates, {} skipped",
                epoch, stats.updates, stats.skipped
            );
            summary.epochs.push(stats);
        }

        progress.finish();
        state.history = Some(history);
        Ok(summary)
    }

    ranker_accessors!();
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::data::UserHistory;
    use crate::evaluation::mean_auc;
    use crate::model::UpdateRule;
    use crate::training::sequential::sequential_step;
    use crate::training::test_data::two_groups;
    use crate::training::CancelToken;

    fn rule() -> UpdateRule {
        UpdateRule {
            eta: 0.1,
            lambda_p: 0.01,
            lambda_q_plus: 0.01,
            lambda_q_minus: 0.001,
        }
    }

    #[test]
    fn test_single_block_matches_sequential() {
        let examples: Vec<TrainingExample> = vec![(0, 0).into(), (0, 1).into(), (1, 2).into()];
        let history = UserHistory::from_examples(2, &examples);
        let mut init_rng = Pcg64::seed_from_u64(50);
        let model = LatentFactorModel::gaussian(2, 3, 4, 0.0, 0.5, &mut init_rng).unwrap();

        // sequential baseline over the same examples and negative draws
        let mut expected = model.clone();
        let mut seq_rng = Pcg64::seed_from_u64(51);
        for ex in &examples {
            assert!(sequential_step(&mut expected, &rule(), &history, *ex, &mut seq_rng));
        }

        let mut actual = model.clone();
        let users = BlockAssignment::from_permutation(&Permutation::shuffled(2, &mut init_rng), 1);
        let items = BlockAssignment::from_permutation(&Permutation::shuffled(3, &mut init_rng), 1);
        let chunks = ItemChunks::from_assignment(&items);
        let grid = PartitionGrid::build(&examples, &users, &items);
        assert_eq!(grid.cell(0, 0), examples.as_slice());

        let cancel = CancelToken::new();
        let progress = ProgressHandle::new("test", None);
        {
            let (umat, imat) = actual.factors_mut();
            let mut user_rows = BlockRowsMut::split(umat, &users).unwrap();
            let mut item_rows = BlockRowsMut::split(imat, &items).unwrap();
            let worker = CellWorker {
                user_rows: user_rows.remove(0),
                item_rows: item_rows.remove(0),
                examples: grid.cell(0, 0),
                candidates: chunks.chunk(0),
                history: &history,
                rule: rule(),
                rng: Pcg64::seed_from_u64(51),
                cancel: &cancel,
                progress: &progress,
            };
            let stats = worker.run(0).unwrap();
            assert_eq!(stats.updates, 3);
        }

        assert_eq!(actual, expected);
        assert_ne!(actual, model);
    }

    #[test]
    fn test_seeded_runs_agree() {
        let config = TrainingConfig {
            num_epochs: 3,
            num_latent_factors: 6,
            seed: Some(52),
            ..Default::default()
        };
        let (train, _) = two_groups(30, 40, 6, 3);
        let mut a = BlockPartitionedBpr::new(config.clone(), 30, 40).unwrap();
        let mut b = BlockPartitionedBpr::new(config, 30, 40).unwrap();
        let sa = a.learn(&train, 4).unwrap();
        let sb = b.learn(&train, 4).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(a.factors(), b.factors());
    }

    #[test]
    fn test_every_example_once_per_epoch() {
        let config = TrainingConfig {
            num_epochs: 5,
            num_latent_factors: 3,
            seed: Some(53),
            ..Default::default()
        };
        let (train, _) = two_groups(24, 36, 5, 4);
        let mut ranker = BlockPartitionedBpr::new(config, 24, 36).unwrap();
        let summary = ranker.learn(&train, 3).unwrap();
        assert_eq!(summary.epochs.len(), 5);
        for e in &summary.epochs {
            assert_eq!(e.updates + e.skipped, train.len());
        }
    }

    #[test]
    fn test_more_workers_than_entities() {
        let config = TrainingConfig {
            num_epochs: 2,
            num_latent_factors: 3,
            seed: Some(54),
            ..Default::default()
        };
        let examples: Vec<TrainingExample> = vec![(0, 0).into(), (1, 2).into(), (2, 1).into()];
        let mut ranker = BlockPartitionedBpr::new(config, 3, 4).unwrap();
        let summary = ranker.learn(&examples, 6).unwrap();
        for e in &summary.epochs {
            assert_eq!(e.updates + e.skipped, 3);
        }
    }

    #[test]
    fn test_cancelled() {
        let config = TrainingConfig {
            seed: Some(55),
            ..Default::default()
        };
        let mut ranker = BlockPartitionedBpr::new(config, 4, 4).unwrap();
        let token = ranker.cancel_token();
        token.cancel();
        let examples: Vec<TrainingExample> = vec![(0, 0).into(), (1, 1).into()];
        assert!(matches!(
            ranker.learn(&examples, 2),
            Err(TrainingError::Interrupted { epoch: 0 })
        ));
        assert!(ranker.history().is_none());
    }

    #[test]
    fn test_training_ranks_held_out() {
        let config = TrainingConfig {
            num_epochs: 60,
            num_latent_factors: 8,
            sigma: 0.1,
            eta: 0.1,
            seed: Some(56),
            ..Default::default()
        };
        let (train, test) = two_groups(40, 40, 10, 5);
        let pairs: Vec<(u32, u32)> = test.iter().map(|ex| (ex.user, ex.item)).collect();
        let mut ranker = BlockPartitionedBpr::new(config, 40, 40).unwrap();
        ranker.learn(&train, 2).unwrap();
        let report = mean_auc(&ranker, &pairs).unwrap();
        assert_eq!(report.evaluated, 40);
        assert!(report.mean > 0.65, "mean AUC {} too low", report.mean);
    }
}
