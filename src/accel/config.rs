// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Training configuration.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::model::UpdateRule;

/// Scheduling strategy used to train the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Single-threaded SGD over the whole corpus.
    Sequential,
    /// Workers update the shared matrices with no partitioning.
    NoPartition,
    /// Conflict-free block-partitioned rounds.
    BlockPartitioned,
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Algorithm::Sequential),
            "no_partition" | "pltrn" => Ok(Algorithm::NoPartition),
            "block_partitioned" | "pltrb" => Ok(Algorithm::BlockPartitioned),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Sequential => "sequential",
            Algorithm::NoPartition => "no_partition",
            Algorithm::BlockPartitioned => "block_partitioned",
        };
        f.write_str(name)
    }
}

/// Hyperparameters for BPR training.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub num_latent_factors: usize,
    /// Mean of the Gaussian initializer.
    pub mu: f64,
    /// Standard deviation of the Gaussian initializer.
    pub sigma: f64,
    pub lambda_p: f64,
    pub lambda_q_plus: f64,
    pub lambda_q_minus: f64,
    /// Learning rate.
    pub eta: f64,
    pub num_epochs: usize,
    pub num_procs: usize,
    pub algorithm: Algorithm,
    /// Master seed; drawn from the thread RNG when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            num_latent_factors: 20,
            mu: 0.0,
            sigma: 0.01,
            lambda_p: 0.0025,
            lambda_q_plus: 0.0025,
            lambda_q_minus: 0.00025,
            eta: 0.01,
            num_epochs: 4,
            num_procs: 4,
            algorithm: Algorithm::BlockPartitioned,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_latent_factors == 0 {
            return Err(ConfigError::invalid(
                "num_latent_factors",
                "must be positive",
            ));
        }
        if self.num_procs == 0 {
            return Err(ConfigError::invalid("num_procs", "must be positive"));
        }
        if !self.mu.is_finite() {
            return Err(ConfigError::invalid("mu", "must be finite"));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(ConfigError::invalid(
                "sigma",
                format!("{} is not a finite non-negative value", self.sigma),
            ));
        }
        let rates = [
            ("eta", self.eta),
            ("lambda_p", self.lambda_p),
            ("lambda_q_plus", self.lambda_q_plus),
            ("lambda_q_minus", self.lambda_q_minus),
        ];
        for (name, value) in rates {
            if !value.is_finite() {
                return Err(ConfigError::invalid(name, "must be finite"));
            }
        }
        Ok(())
    }

    /// The per-example update rule these hyperparameters describe.
    pub fn update_rule(&self) -> UpdateRule {
        UpdateRule {
            eta: self.eta as f32,
            lambda_p: self.lambda_p as f32,
            lambda_q_plus: self.lambda_q_plus as f32,
            lambda_q_minus: self.lambda_q_minus as f32,
        }
    }

    /// Resolve the master seed, drawing one if none was configured.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
