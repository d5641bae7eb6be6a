// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! BPR trainers and the ranking model contract they share.
use std::ops::AddAssign;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::config::{Algorithm, TrainingConfig};
use crate::data::UserHistory;
use crate::errors::{ConfigError, EvaluationError, TrainingError};
use crate::evaluation;
use crate::model::{LatentFactorModel, UpdateRule};
use crate::types::{ItemId, TrainingExample, UserId};

mod blocked;
mod hogwild;
mod sequential;
mod worker;

pub use blocked::BlockPartitionedBpr;
pub use hogwild::NoPartitionBpr;
pub use sequential::SequentialBpr;
pub use worker::CellWorker;

/// Examples processed between cancellation checks.
pub(crate) const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Common interface of the BPR training strategies.
pub trait PairwiseRanker: Send + Sync {
    /// The scheduling strategy this ranker trains with.
    fn algorithm(&self) -> Algorithm;

    /// Train on a corpus of positive examples with `num_procs` workers.
    ///
    /// User and item IDs must lie within the model's shape.
    fn learn(
        &mut self,
        examples: &[TrainingExample],
        num_procs: usize,
    ) -> Result<TrainingSummary, TrainingError>;

    fn factors(&self) -> &LatentFactorModel;

    /// The history built by the last call to [PairwiseRanker::learn].
    fn history(&self) -> Option<&UserHistory>;

    /// Token that interrupts training when cancelled.
    fn cancel_token(&self) -> CancelToken;

    fn score(&self, user: UserId, item: ItemId) -> Result<f32, EvaluationError> {
        let model = self.factors();
        if user as usize >= model.num_users() {
            return Err(EvaluationError::UnknownUser(user));
        }
        if item as usize >= model.num_items() {
            return Err(EvaluationError::UnknownItem(item));
        }
        Ok(model.score(user, item))
    }

    /// Fraction of the user's eligible items ranked strictly below `item`.
    fn auc(&self, user: UserId, item: ItemId) -> Result<f64, EvaluationError> {
        let history = self.history().ok_or(EvaluationError::NotTrained)?;
        evaluation::auc(self.factors(), history, user, item)
    }
}

/// Construct the ranker selected by a configuration, with fresh factors.
pub fn build_ranker(
    config: &TrainingConfig,
    num_users: usize,
    num_items: usize,
) -> Result<Box<dyn PairwiseRanker>, ConfigError> {
    let ranker: Box<dyn PairwiseRanker> = match config.algorithm {
        Algorithm::Sequential => Box::new(SequentialBpr::new(config.clone(), num_users, num_items)?),
        Algorithm::NoPartition => Box::new(NoPartitionBpr::new(config.clone(), num_users, num_items)?),
        Algorithm::BlockPartitioned => {
            Box::new(BlockPartitionedBpr::new(config.clone(), num_users, num_items)?)
        }
    };
    Ok(ranker)
}

/// Counts from one training epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpochStats {
    /// Examples that produced a gradient step.
    pub updates: usize,
    /// Examples dropped because no negative item could be sampled.
    pub skipped: usize,
}

impl AddAssign for EpochStats {
    fn add_assign(&mut self, rhs: Self) {
        self.updates += rhs.updates;
        self.skipped += rhs.skipped;
    }
}

/// Per-epoch statistics of a training run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub epochs: Vec<EpochStats>,
}

impl TrainingSummary {
    pub fn total(&self) -> EpochStats {
        let mut total = EpochStats::default();
        for e in &self.epochs {
            total += *e;
        }
        total
    }
}

/// Shared flag that interrupts a training run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// State common to every trainer.
pub(crate) struct TrainerState {
    pub config: TrainingConfig,
    pub rule: UpdateRule,
    pub model: LatentFactorModel,
    pub history: Option<UserHistory>,
    pub rng: Pcg64,
    pub cancel: CancelToken,
}

impl TrainerState {
    /// Set up a trainer with Gaussian-initialized factors.
    pub fn new(
        config: TrainingConfig,
        num_users: usize,
        num_items: usize,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.resolve_seed();
        debug!("training {} model with seed {}", config.algorithm, seed);
        let mut rng = Pcg64::seed_from_u64(seed);
        let model = LatentFactorModel::gaussian(
            num_users,
            num_items,
            config.num_latent_factors,
            config.mu,
            config.sigma,
            &mut rng,
        )?;
        Ok(TrainerState {
            rule: config.update_rule(),
            config,
            model,
            history: None,
            rng,
            cancel: CancelToken::new(),
        })
    }

    /// Set up a trainer that continues from existing factors.
    pub fn with_model(config: TrainingConfig, model: LatentFactorModel) -> Result<Self, ConfigError> {
        config.validate()?;
        if model.num_factors() != config.num_latent_factors {
            return Err(ConfigError::invalid(
                "num_latent_factors",
                format!(
                    "model has {} factors, configuration asks for {}",
                    model.num_factors(),
                    config.num_latent_factors
                ),
            ));
        }
        let rng = Pcg64::seed_from_u64(config.resolve_seed());
        Ok(TrainerState {
            rule: config.update_rule(),
            config,
            model,
            history: None,
            rng,
            cancel: CancelToken::new(),
        })
    }

    /// Check a corpus against the model shape and build its history.
    pub fn prepare(&self, examples: &[TrainingExample]) -> Result<UserHistory, TrainingError> {
        let num_users = self.model.num_users();
        let num_items = self.model.num_items();
        for (index, ex) in examples.iter().enumerate() {
            if ex.user as usize >= num_users || ex.item as usize >= num_items {
                return Err(TrainingError::OutOfRange {
                    index,
                    user: ex.user,
                    item: ex.item,
                    num_users,
                    num_items,
                });
            }
        }
        Ok(UserHistory::from_examples(num_users, examples))
    }

    pub fn check_cancel(&self, epoch: usize) -> Result<(), TrainingError> {
        if self.cancel.is_cancelled() {
            Err(TrainingError::Interrupted { epoch })
        } else {
            Ok(())
        }
    }
}

/// Implement the accessor half of [PairwiseRanker] for a trainer wrapping a
/// [TrainerState] in a `state` field.
macro_rules! ranker_accessors {
    () => {
        fn factors(&self) -> &crate::model::LatentFactorModel {
            &self.state.model
        }

        fn history(&self) -> Option<&crate::data::UserHistory> {
            self.state.history.as_ref()
        }

        fn cancel_token(&self) -> crate::training::CancelToken {
            self.state.cancel.clone()
        }
    };
}
pub(crate) use ranker_accessors;

#[cfg(test)]
pub(crate) mod test_data {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use crate::types::TrainingExample;

    /// Two user groups that each prefer their own half of the items.
    ///
    /// Returns the training corpus and one held-out in-group item per user.
    pub fn two_groups(
        num_users: u32,
        num_items: u32,
        per_user: usize,
        seed: u64,
    ) -> (Vec<TrainingExample>, Vec<TrainingExample>) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let half_u = num_users / 2;
        let half_i = num_items / 2;
        let mut train = Vec::new();
        let mut test = Vec::new();
        for user in 0..num_users {
            let mut group: Vec<u32> = if user < half_u {
                (0..half_i).collect()
            } else {
                (half_i..num_items).collect()
            };
            group.shuffle(&mut rng);
            test.push(TrainingExample::new(user, group[0]));
            for item in &group[1..=per_user] {
                train.push(TrainingExample::new(user, *item));
            }
        }
        train.shuffle(&mut rng);
        (train, test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ranker_selects() {
        for algo in [
            Algorithm::Sequential,
            Algorithm::NoPartition,
            Algorithm::BlockPartitioned,
        ] {
            let config = TrainingConfig {
                algorithm: algo,
                seed: Some(1),
                ..Default::default()
            };
            let ranker = build_ranker(&config, 5, 6).unwrap();
            assert_eq!(ranker.algorithm(), algo);
            assert_eq!(ranker.factors().num_users(), 5);
            assert_eq!(ranker.factors().num_items(), 6);
            assert_eq!(ranker.factors().num_factors(), 20);
        }
    }

    #[test]
    fn test_build_ranker_invalid() {
        let config = TrainingConfig {
            num_latent_factors: 0,
            ..Default::default()
        };
        assert!(build_ranker(&config, 5, 6).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let config = TrainingConfig {
            seed: Some(2),
            ..Default::default()
        };
        for algo in [
            Algorithm::Sequential,
            Algorithm::NoPartition,
            Algorithm::BlockPartitioned,
        ] {
            let mut ranker = build_ranker(
                &TrainingConfig {
                    algorithm: algo,
                    ..config.clone()
                },
                3,
                3,
            )
            .unwrap();
            let examples: Vec<TrainingExample> = vec![(0, 0).into(), (1, 3).into()];
            let err = ranker.learn(&examples, 2).unwrap_err();
            assert!(matches!(
                err,
                TrainingError::OutOfRange {
                    index: 1,
                    user: 1,
                    item: 3,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_eval_before_learn() {
        let config = TrainingConfig {
            seed: Some(3),
            ..Default::default()
        };
        let ranker = build_ranker(&config, 3, 3).unwrap();
        assert_eq!(ranker.auc(0, 0), Err(EvaluationError::NotTrained));
        assert!(ranker.score(0, 0).is_ok());
        assert_eq!(ranker.score(3, 0), Err(EvaluationError::UnknownUser(3)));
        assert_eq!(ranker.score(0, 9), Err(EvaluationError::UnknownItem(9)));
    }

    #[test]
    fn test_summary_total() {
        let summary = TrainingSummary {
            epochs: vec![
                EpochStats {
                    updates: 3,
                    skipped: 1,
                },
                EpochStats {
                    updates: 4,
                    skipped: 0,
                },
            ],
        };
        assert_eq!(
            summary.total(),
            EpochStats {
                updates: 7,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!other.is_cancelled());
    }
}
