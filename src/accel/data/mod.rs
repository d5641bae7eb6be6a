// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Training data and user histories.
mod history;
mod ingest;

pub use history::UserHistory;
pub use ingest::{read_training_file, read_training_tsv, TrainingData};
