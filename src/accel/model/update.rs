// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! The BPR gradient step and its vector helpers.

/// Numerically stable logistic function.
///
/// Only the exponential of a non-positive value is ever taken, so neither
/// branch can overflow.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    if x > 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[inline]
pub fn dot(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Compute `x·y - x·z` in a single pass.
#[inline]
pub fn diff_dot(x: &[f32], y: &[f32], z: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len(), z.len());
    x.iter()
        .zip(y.iter().zip(z))
        .map(|(a, (b, c))| a * (b - c))
        .sum()
}

/// Learning rate and regularization for one BPR step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateRule {
    pub eta: f32,
    pub lambda_p: f32,
    pub lambda_q_plus: f32,
    pub lambda_q_minus: f32,
}

impl UpdateRule {
    /// Apply one stochastic gradient step to a (user, positive, negative) triple
    /// of factor rows, in place. Returns the `1 - σ(x̂ᵤᵢⱼ)` weight used.
    ///
    /// The user row is updated first; both item updates read the new user row.
    /// There is no synchronization here: callers must hold the only live
    /// references to these three rows.
    pub fn apply(&self, user: &mut [f32], pos: &mut [f32], neg: &mut [f32]) -> f32 {
        assert_eq!(user.len(), pos.len());
        assert_eq!(user.len(), neg.len());

        let delta = 1.0 - sigmoid(diff_dot(user, pos, neg));
        let eta = self.eta;

        for ((u, p), n) in user.iter_mut().zip(pos.iter()).zip(neg.iter()) {
            *u += eta * (delta * (p - n) - self.lambda_p * *u);
        }
        for (p, u) in pos.iter_mut().zip(user.iter()) {
            *p += eta * (delta * u - self.lambda_q_plus * *p);
        }
        for (n, u) in neg.iter_mut().zip(user.iter()) {
            *n += eta * (-delta * u - self.lambda_q_minus * *n);
        }

        delta
    }
}

#[test]
fn test_sigmoid_midpoint() {
    assert_eq!(sigmoid(0.0), 0.5);
}

#[test]
fn test_sigmoid_extremes() {
    let hi = sigmoid(1000.0);
    let lo = sigmoid(-1000.0);
    assert!(hi.is_finite() && lo.is_finite());
    assert_eq!(hi, 1.0);
    assert_eq!(lo, 0.0);
}

#[test]
fn test_sigmoid_symmetric() {
    for x in [0.1f32, 1.0, 3.5, 12.0] {
        let s = sigmoid(x) + sigmoid(-x);
        assert!((s - 1.0).abs() < 1e-6);
    }
}

#[test]
fn test_diff_dot() {
    let x = [1.0, 2.0, 3.0];
    let y = [4.0, 5.0, 6.0];
    let z = [1.0, 1.0, 1.0];
    assert_eq!(diff_dot(&x, &y, &z), dot(&x, &y) - dot(&x, &z));
}

#[test]
fn test_update_by_hand() {
    let rule = UpdateRule {
        eta: 0.5,
        lambda_p: 0.1,
        lambda_q_plus: 0.2,
        lambda_q_minus: 0.3,
    };
    let mut u = [1.0f32, 0.0];
    let mut p = [0.0f32, 1.0];
    let mut n = [0.0f32, 0.0];

    // x̂ = u·p - u·n = 0, so delta = 0.5
    let delta = rule.apply(&mut u, &mut p, &mut n);
    assert_eq!(delta, 0.5);

    // u += 0.5 * (0.5 * (p - n) - 0.1 * u)
    assert!((u[0] - 0.95).abs() < 1e-6);
    assert!((u[1] - 0.25).abs() < 1e-6);
    // p += 0.5 * (0.5 * u' - 0.2 * p), using the updated user row
    assert!((p[0] - 0.2375).abs() < 1e-6);
    assert!((p[1] - (1.0 + 0.5 * (0.125 - 0.2))).abs() < 1e-6);
    // n += 0.5 * (-0.5 * u' - 0.3 * n)
    assert!((n[0] + 0.2375).abs() < 1e-6);
    assert!((n[1] + 0.0625).abs() < 1e-6);
}

#[test]
fn test_update_moves_scores_apart() {
    let rule = UpdateRule {
        eta: 0.05,
        lambda_p: 0.0,
        lambda_q_plus: 0.0,
        lambda_q_minus: 0.0,
    };
    let mut u = [0.3f32, -0.2, 0.1];
    let mut p = [0.1f32, 0.1, 0.1];
    let mut n = [0.2f32, 0.0, -0.1];
    let before = diff_dot(&u, &p, &n);
    rule.apply(&mut u, &mut p, &mut n);
    let after = diff_dot(&u, &p, &n);
    assert!(after > before);
}
