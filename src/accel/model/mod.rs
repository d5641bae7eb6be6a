// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Latent factor model and the BPR update rule.
mod factors;
mod update;

pub use factors::LatentFactorModel;
pub use update::{diff_dot, dot, sigmoid, UpdateRule};
