// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Parallel pairwise learning to rank.
//!
//! BPR matrix factorization trained by stochastic gradient descent, with a
//! conflict-free block-partitioned parallel scheduler alongside sequential
//! and unsynchronized parallel baselines.
#[cfg(feature = "python")]
use pyo3::prelude::*;

mod atomic;
pub mod config;
pub mod data;
pub mod errors;
pub mod evaluation;
pub mod model;
mod parallel;
pub mod partition;
mod progress;
#[cfg(feature = "python")]
mod python;
pub mod sampling;
pub mod schedule;
pub mod training;
pub mod types;

pub use config::{Algorithm, TrainingConfig};
pub use errors::{ConfigError, EvaluationError, IngestError, TrainingError};
pub use evaluation::{mean_auc, AucReport};
pub use model::LatentFactorModel;
pub use training::{
    build_ranker, BlockPartitionedBpr, CancelToken, EpochStats, NoPartitionBpr, PairwiseRanker,
    SequentialBpr, TrainingSummary,
};
pub use types::{ItemId, TrainingExample, UserId};

/// Entry point for the PLtR accelerator module.
#[cfg(feature = "python")]
#[pymodule]
fn _accel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<python::BprTrainer>()?;
    m.add_function(wrap_pyfunction!(python::read_training_file, m)?)?;
    m.add_function(wrap_pyfunction!(parallel::init_accel_pool, m)?)?;
    m.add_function(wrap_pyfunction!(parallel::thread_count, m)?)?;

    Ok(())
}
