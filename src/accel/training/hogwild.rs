// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Parallel BPR with no partitioning.
//!
//! Every worker samples from the whole corpus and updates the shared factor
//! matrices directly. Concurrent updates to the same row race; each value is
//! read and written atomically, but a step may work from a stale row or
//! overwrite another worker's step. Results are not reproducible.
use log::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::ThreadPool;

use crate::atomic::SharedMatrix;
use crate::config::{Algorithm, TrainingConfig};
use crate::data::UserHistory;
use crate::errors::{ConfigError, TrainingError};
use crate::model::{LatentFactorModel, UpdateRule};
use crate::parallel::{run_tasks, worker_pool};
use crate::progress::ProgressHandle;
use crate::sampling::sample_negative;
use crate::types::{ItemId, TrainingExample};

use super::{
    ranker_accessors, CancelToken, EpochStats, PairwiseRanker, TrainerState, TrainingSummary,
    CANCEL_CHECK_INTERVAL,
};

/// Unsynchronized parallel SGD trainer.
///
/// Each of the `num_procs` workers runs `num_epochs / num_procs` epochs, so
/// the total work matches the sequential trainer.
pub struct NoPartitionBpr {
    state: TrainerState,
}

impl NoPartitionBpr {
    pub fn new(config: TrainingConfig, num_users: usize, num_items: usize) -> Result<Self, ConfigError> {
        Ok(NoPartitionBpr {
            state: TrainerState::new(config, num_users, num_items)?,
        })
    }

    pub fn from_model(config: TrainingConfig, model: LatentFactorModel) -> Result<Self, ConfigError> {
        Ok(NoPartitionBpr {
            state: TrainerState::with_model(config, model)?,
        })
    }
}

struct SharedFactors {
    users: SharedMatrix,
    items: SharedMatrix,
}

struct HogwildWorker<'a> {
    factors: &'a SharedFactors,
    examples: &'a [TrainingExample],
    history: &'a UserHistory,
    rule: UpdateRule,
    rng: Pcg64,
    n_epochs: usize,
    cancel: &'a CancelToken,
    progress: &'a ProgressHandle,
}

impl HogwildWorker<'_> {
    fn run(mut self) -> Result<Vec<EpochStats>, TrainingError> {
        let n = self.examples.len();
        let universe = 0..self.factors.items.n_rows() as ItemId;
        let k = self.factors.users.n_cols();
        let mut u_buf = vec![0.0; k];
        let mut p_buf = vec![0.0; k];
        let mut n_buf = vec![0.0; k];
        let mut epochs = Vec::with_capacity(self.n_epochs);

        for epoch in 0..self.n_epochs {
            let mut stats = EpochStats::default();
            for step in 0..n {
                if step % CANCEL_CHECK_INTERVAL == 0 && self.cancel.is_cancelled() {
                    return Err(TrainingError::Interrupted { epoch });
                }
                let ex = self.examples[self.rng.random_range(0..n)];
                let Some(neg) = sample_negative(&mut self.rng, &universe, self.history, ex.user)
                else {
                    stats.skipped += 1;
                    continue;
                };

                let user = ex.user as usize;
                self.factors.users.load_row(user, &mut u_buf);
                self.factors.items.load_row(ex.item as usize, &mut p_buf);
                self.factors.items.load_row(neg as usize, &mut n_buf);
                self.rule.apply(&mut u_buf, &mut p_buf, &mut n_buf);
                self.factors.users.store_row(user, &u_buf);
                self.factors.items.store_row(ex.item as usize, &p_buf);
                self.factors.items.store_row(neg as usize, &n_buf);
                stats.updates += 1;
            }
            self.progress.advance(n);
            epochs.push(stats);
        }

        Ok(epochs)
    }
}

/// Run all workers to completion; a panic in any of them fails the run.
fn run_workers(
    pool: &ThreadPool,
    workers: Vec<HogwildWorker<'_>>,
) -> Result<Vec<Result<Vec<EpochStats>, TrainingError>>, TrainingError> {
    run_tasks(pool, workers, |w| w.run())
        .map_err(|message| TrainingError::NoPartitionWorkerPanicked { message })
}

impl PairwiseRanker for NoPartitionBpr {
    fn algorithm(&self) -> Algorithm {
        Algorithm::NoPartition
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
        let n_epochs = self.state.config.num_epochs / num_procs;
        if n_epochs == 0 {
            warn!(
                "{} epochs split over {} workers leaves no work per worker",
                self.state.config.num_epochs, num_procs
            );
        }

        let pool = worker_pool(num_procs)?;
        let factors = SharedFactors {
            users: SharedMatrix::from_array(self.state.model.user_factors()),
            items: SharedMatrix::from_array(self.state.model.item_factors()),
        };
        let progress = ProgressHandle::new(
            "no-partition BPR",
            Some(examples.len() * n_epochs * num_procs),
        );

        let workers: Vec<HogwildWorker> = (0..num_procs)
            .map(|_| HogwildWorker {
                factors: &factors,
                examples,
                history: &history,
                rule: self.state.rule,
                rng: Pcg64::seed_from_u64(self.state.rng.random()),
                n_epochs,
                cancel: &self.state.cancel,
                progress: &progress,
            })
            .collect();

        let results = run_workers(&pool, workers)?;

        let mut summary = TrainingSummary::default();
        for (w, res) in results.into_iter().enumerate() {
            let epochs = res?;
            for (e, stats) in epochs.iter().enumerate() {
                debug!(
                    "worker {} epoch {}: {} updates, {} skipped",
                    w, e, stats.updates, stats.skipped
                );
            }
            summary.epochs.extend(epochs);
        }
        let total = summary.total();
        info!(
            "trained {} worker-epochs: {} updates, {} skipped",
            summary.epochs.len(),
            total.updates,
            total.skipped
        );
        progress.finish();

        let (mut users, mut items) = self.state.model.factors_mut();
        users.assign(&factors.users.to_array());
        items.assign(&factors.items.to_array());
        self.state.history = Some(history);
        Ok(summary)
    }

    ranker_accessors!();
}
