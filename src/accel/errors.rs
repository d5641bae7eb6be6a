// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Error types for configuration, training, evaluation and ingestion.
use thiserror::Error;

use crate::types::{ItemId, UserId};

/// Invalid hyperparameters or configuration input.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
    #[error("unknown algorithm {0:?} (expected sequential, no_partition or block_partitioned)")]
    UnknownAlgorithm(String),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid<S: Into<String>>(name: &'static str, message: S) -> Self {
        ConfigError::InvalidValue {
            name,
            message: message.into(),
        }
    }
}

/// Failures that abort a training run.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("worker panicked in epoch {epoch}, round {round}: {message}")]
    WorkerPanicked {
        epoch: usize,
        round: usize,
        message: String,
    },
    #[error("no-partition worker panicked: {message}")]
    NoPartitionWorkerPanicked { message: String },
    #[error("training interrupted during epoch {epoch}")]
    Interrupted { epoch: usize },
    #[error("training requires at least one worker")]
    NoWorkers,
    #[error("example {index} ({user}, {item}) is outside the model shape {num_users}x{num_items}")]
    OutOfRange {
        index: usize,
        user: UserId,
        item: ItemId,
        num_users: usize,
        num_items: usize,
    },
    #[error("item block {block} scheduled twice in round {round}")]
    ScheduleConflict { round: usize, block: usize },
    #[error("factor matrix is not in standard layout")]
    MatrixLayout,
    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures computing evaluation metrics.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("user {user} has no eligible comparison items")]
    NoEligibleItems { user: UserId },
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error("model must be trained before evaluation")]
    NotTrained,
    #[error("no test pair could be evaluated ({skipped} skipped)")]
    NoEvaluatedPairs { skipped: usize },
}

/// Failures reading training data.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

#[cfg(feature = "python")]
mod py_conversions {
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::PyErr;

    use super::*;

    impl From<ConfigError> for PyErr {
        fn from(value: ConfigError) -> Self {
            PyValueError::new_err(format!("{}", value))
        }
    }

    impl From<TrainingError> for PyErr {
        fn from(value: TrainingError) -> Self {
            PyRuntimeError::new_err(format!("training failed: {}", value))
        }
    }

    impl From<EvaluationError> for PyErr {
        fn from(value: EvaluationError) -> Self {
            PyValueError::new_err(format!("{}", value))
        }
    }

    impl From<IngestError> for PyErr {
        fn from(value: IngestError) -> Self {
            PyValueError::new_err(format!("{}", value))
        }
    }
}
