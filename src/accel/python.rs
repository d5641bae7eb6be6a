// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Python bindings for the trainers.
use std::path::PathBuf;

use arrow::{
    array::{downcast_array, make_array, Array, ArrayData, ArrowPrimitiveType, Int32Array, PrimitiveArray},
    datatypes::Int32Type,
    pyarrow::PyArrowType,
};
use numpy::{PyArray1, PyArray2};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

use crate::config::TrainingConfig;
use crate::data;
use crate::errors::ConfigError;
use crate::training::{build_ranker, PairwiseRanker};
use crate::types::TrainingExample;

fn checked_array<E: ArrowPrimitiveType + 'static>(
    name: &str,
    array: &dyn Array,
) -> PyResult<PrimitiveArray<E>> {
    if !array.data_type().equals_datatype(&E::DATA_TYPE) {
        return Err(PyTypeError::new_err(format!(
            "invalid {} type {}, expected {}",
            name,
            array.data_type(),
            E::DATA_TYPE
        )));
    }
    if array.null_count() > 0 {
        return Err(PyValueError::new_err(format!("{} contains nulls", name)));
    }
    Ok(downcast_array(array))
}

#[derive(FromPyObject, Clone, Debug)]
struct PyBprConfig {
    num_latent_factors: usize,
    mu: f64,
    sigma: f64,
    lambda_p: f64,
    lambda_q_plus: f64,
    lambda_q_minus: f64,
    eta: f64,
    num_epochs: usize,
    num_procs: usize,
    algorithm: String,
    seed: Option<u64>,
}

impl TryFrom<PyBprConfig> for TrainingConfig {
    type Error = ConfigError;

    fn try_from(cfg: PyBprConfig) -> Result<Self, ConfigError> {
        let config = TrainingConfig {
            num_latent_factors: cfg.num_latent_factors,
            mu: cfg.mu,
            sigma: cfg.sigma,
            lambda_p: cfg.lambda_p,
            lambda_q_plus: cfg.lambda_q_plus,
            lambda_q_minus: cfg.lambda_q_minus,
            eta: cfg.eta,
            num_epochs: cfg.num_epochs,
            num_procs: cfg.num_procs,
            algorithm: cfg.algorithm.parse()?,
            seed: cfg.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(FromPyObject)]
struct BprTrainingInput {
    users: PyArrowType<ArrayData>,
    items: PyArrowType<ArrayData>,
}

impl BprTrainingInput {
    fn examples(self) -> PyResult<Vec<TrainingExample>> {
        let users: Int32Array = checked_array::<Int32Type>("users", &make_array(self.users.0))?;
        let items: Int32Array = checked_array::<Int32Type>("items", &make_array(self.items.0))?;
        if users.len() != items.len() {
            return Err(PyValueError::new_err(format!(
                "{} users but {} items",
                users.len(),
                items.len()
            )));
        }
        users
            .values()
            .iter()
            .zip(items.values().iter())
            .map(|(u, i)| match (u32::try_from(*u), u32::try_from(*i)) {
                (Ok(u), Ok(i)) => Ok(TrainingExample::new(u, i)),
                _ => Err(PyValueError::new_err(format!("negative id in ({}, {})", u, i))),
            })
            .collect()
    }
}

/// Train BPR models.
#[pyclass]
pub struct BprTrainer {
    num_procs: usize,
    ranker: Box<dyn PairwiseRanker>,
}

#[pymethods]
impl BprTrainer {
    /// Instantiate a new trainer with freshly initialized factors.
    #[new]
    fn new<'py>(config: Bound<'py, PyAny>, num_users: usize, num_items: usize) -> PyResult<Self> {
        let config: TrainingConfig = PyBprConfig::extract_bound(&config)?.try_into()?;
        Ok(BprTrainer {
            num_procs: config.num_procs,
            ranker: build_ranker(&config, num_users, num_items)?,
        })
    }

    /// Train on positive examples. Returns `(updates, skipped)` per epoch.
    #[pyo3(signature = (data, num_procs=None))]
    fn learn(
        &mut self,
        py: Python<'_>,
        data: BprTrainingInput,
        num_procs: Option<usize>,
    ) -> PyResult<Vec<(usize, usize)>> {
        let examples = data.examples()?;
        let num_procs = num_procs.unwrap_or(self.num_procs);
        let ranker = &mut self.ranker;
        let summary = py.allow_threads(|| ranker.learn(&examples, num_procs))?;
        Ok(summary
            .epochs
            .iter()
            .map(|e| (e.updates, e.skipped))
            .collect())
    }

    fn algorithm(&self) -> String {
        self.ranker.algorithm().to_string()
    }

    fn score(&self, user: u32, item: u32) -> PyResult<f32> {
        Ok(self.ranker.score(user, item)?)
    }

    fn auc(&self, user: u32, item: u32) -> PyResult<f64> {
        Ok(self.ranker.auc(user, item)?)
    }

    fn user_factors<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f32>> {
        PyArray2::from_array(py, &self.ranker.factors().user_factors())
    }

    fn item_factors<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f32>> {
        PyArray2::from_array(py, &self.ranker.factors().item_factors())
    }
}

/// Read a tab-separated training file into user and item ID arrays plus the
/// inferred user and item counts.
#[pyfunction]
pub fn read_training_file<'py>(
    py: Python<'py>,
    path: PathBuf,
) -> PyResult<(Bound<'py, PyArray1<u32>>, Bound<'py, PyArray1<u32>>, usize, usize)> {
    let data = py.allow_threads(|| data::read_training_file(&path))?;
    let users: Vec<u32> = data.examples.iter().map(|ex| ex.user).collect();
    let items: Vec<u32> = data.examples.iter().map(|ex| ex.item).collect();
    Ok((
        PyArray1::from_vec(py, users),
        PyArray1::from_vec(py, items),
        data.num_users,
        data.num_items,
    ))
}
