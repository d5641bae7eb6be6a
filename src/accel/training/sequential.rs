// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Single-threaded BPR over the whole corpus.
use log::*;
use rand::Rng;

use crate::config::{Algorithm, TrainingConfig};
use crate::data::UserHistory;
use crate::errors::{ConfigError, TrainingError};
use crate::model::{LatentFactorModel, UpdateRule};
use crate::progress::ProgressHandle;
use crate::sampling::sample_negative;
use crate::types::{ItemId, TrainingExample};

use super::{
    ranker_accessors, EpochStats, PairwiseRanker, TrainerState, TrainingSummary,
    CANCEL_CHECK_INTERVAL,
};

/// Sequential SGD trainer.
///
/// Each epoch draws as many examples as the corpus holds, uniformly with
/// replacement, and samples negatives from the whole item universe.
pub struct SequentialBpr {
    state: TrainerState,
}

impl SequentialBpr {
    pub fn new(config: TrainingConfig, num_users: usize, num_items: usize) -> Result<Self, ConfigError> {
        Ok(SequentialBpr {
            state: TrainerState::new(config, num_users, num_items)?,
        })
    }

    pub fn from_model(config: TrainingConfig, model: LatentFactorModel) -> Result<Self, ConfigError> {
        Ok(SequentialBpr {
            state: TrainerState::with_model(config, model)?,
        })
    }
}

/// One SGD step for a positive example, with a negative drawn from all items.
///
/// Returns `false` if no negative could be sampled and the example was skipped.
pub(crate) fn sequential_step<R: Rng + ?Sized>(
    model: &mut LatentFactorModel,
    rule: &UpdateRule,
    history: &UserHistory,
    example: TrainingExample,
    rng: &mut R,
) -> bool {
    let universe = 0..model.num_items() as ItemId;
    match sample_negative(rng, &universe, history, example.user) {
        Some(neg) => {
            model.update(rule, example.user, example.item, neg);
            true
        }
        None => false,
    }
}

impl PairwiseRanker for SequentialBpr {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sequential
    }

    fn learn(
        &mut self,
        examples: &[TrainingExample],
        _num_procs: usize,
    ) -> Result<TrainingSummary, TrainingError> {
        let history = self.state.prepare(examples)?;
        let n = examples.len();
        let n_epochs = self.state.config.num_epochs;
        let progress = ProgressHandle::new("sequential BPR", Some(n * n_epochs));
        let mut summary = TrainingSummary::default();

        for epoch in 0..n_epochs {
            let mut stats = EpochStats::default();
            for step in 0..n {
                if step % CANCEL_CHECK_INTERVAL == 0 {
                    self.state.check_cancel(epoch)?;
                }
                let idx = self.state.rng.random_range(0..n);
                let state = &mut self.state;
                if sequential_step(
                    &mut state.model,
                    &state.rule,
                    &history,
                    examples[idx],
                    &mut state.rng,
                ) {
                    stats.updates += 1;
                } else {
                    stats.skipped += 1;
                }
            }
            progress.advance(n);
            info!(
                "epoch {}: {} updates, {} skipped",
                epoch, stats.updates, stats.skipped
            );
            summary.epochs.push(stats);
        }

        progress.finish();
        self.state.history = Some(history);
        Ok(summary)
    }

    ranker_accessors!();
}
