// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-user AUC of held-out items.
use log::*;
use rayon::prelude::*;

use crate::data::UserHistory;
use crate::errors::EvaluationError;
use crate::model::LatentFactorModel;
use crate::training::PairwiseRanker;
use crate::types::{ItemId, UserId};

/// Compute the AUC of one `(user, item)` test pair.
///
/// This is the fraction of the user's eligible items (those not in the
/// history and not `item` itself) whose score is strictly below the score of
/// `item`.
pub fn auc(
    model: &LatentFactorModel,
    history: &UserHistory,
    user: UserId,
    item: ItemId,
) -> Result<f64, EvaluationError> {
    if user as usize >= model.num_users() {
        return Err(EvaluationError::UnknownUser(user));
    }
    if item as usize >= model.num_items() {
        return Err(EvaluationError::UnknownItem(item));
    }

    let scores = model.item_factors().dot(&model.user_row(user));
    let target = scores[item as usize];
    let mut eligible = 0usize;
    let mut below = 0usize;
    for (i, score) in scores.iter().enumerate() {
        let i = i as ItemId;
        if i == item || history.contains(user, i) {
            continue;
        }
        eligible += 1;
        if *score < target {
            below += 1;
        }
    }

    if eligible == 0 {
        return Err(EvaluationError::NoEligibleItems { user });
    }
    Ok(below as f64 / eligible as f64)
}

/// Aggregate AUC over a set of test pairs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AucReport {
    /// Mean AUC of the evaluated pairs.
    pub mean: f64,
    pub evaluated: usize,
    /// Pairs whose user had no eligible comparison items.
    pub skipped: usize,
}

/// Compute the mean AUC of a trained ranker over test pairs, in parallel.
///
/// Pairs whose user has no eligible items are counted as skipped; any other
/// evaluation error fails the whole computation. If no pair is left to
/// evaluate (including an empty `pairs`), this fails with
/// [EvaluationError::NoEvaluatedPairs].
pub fn mean_auc<R: PairwiseRanker + ?Sized>(
    ranker: &R,
    pairs: &[(UserId, ItemId)],
) -> Result<AucReport, EvaluationError> {
    let (sum, evaluated, skipped) = pairs
        .par_iter()
        .map(|(u, i)| match ranker.auc(*u, *i) {
            Ok(v) => Ok((v, 1, 0)),
            Err(EvaluationError::NoEligibleItems { .. }) => Ok((0.0, 0, 1)),
            Err(e) => Err(e),
        })
        .try_reduce(
            || (0.0, 0usize, 0usize),
            |a, b| Ok((a.0 + b.0, a.1 + b.1, a.2 + b.2)),
        )?;

    if skipped > 0 {
        warn!("{} of {} test pairs had no eligible items", skipped, pairs.len());
    }
    if evaluated == 0 {
        return Err(EvaluationError::NoEvaluatedPairs { skipped });
    }
    Ok(AucReport {
        mean: sum / evaluated as f64,
        evaluated,
        skipped,
    })
}
