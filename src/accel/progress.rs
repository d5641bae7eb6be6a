// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use std::sync::RwLock;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use log::*;

const UPDATE_SECS: f64 = 0.2;

#[derive(Clone, Copy)]
struct UpdateState {
    count: usize,
    time: f64,
    rate: f64,
}

/// Throttled progress counter shared by training workers.
///
/// Workers add the number of examples they process; at most every
/// [UPDATE_SECS] seconds the current count and rate are logged at debug level.
pub(crate) struct ProgressHandle {
    label: String,
    total: Option<usize>,
    start: Instant,
    count: AtomicUsize,
    last_update: RwLock<Option<UpdateState>>,
}

impl ProgressHandle {
    pub fn new<S: Into<String>>(label: S, total: Option<usize>) -> Self {
        ProgressHandle {
            label: label.into(),
            total,
            count: AtomicUsize::new(0),
            start: Instant::now(),
            last_update: RwLock::new(None),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn advance(&self, n: usize) {
        let count = self.count.fetch_add(n, Ordering::Relaxed) + n;

        let last_update = {
            let lock = self.last_update.read().expect("poisoned lock");
            *lock
        };

        let thresh = if let Some(lu) = last_update {
            // bail early if the rate estimate says we don't need to update
            let n = (count - lu.count) as f64;
            if n / lu.rate < UPDATE_SECS * 0.95 {
                return;
            }

            lu.time
        } else {
            0.0
        };

        let time = self.start.elapsed().as_secs_f64();
        if time < thresh + UPDATE_SECS {
            return;
        }

        // if someone else is writing, they've handled it
        if let Ok(mut lock) = self.last_update.try_write() {
            let rate = count as f64 / time;
            *lock = Some(UpdateState { count, time, rate });
            self.refresh(count, rate);
        }
    }

    /// Log the final count.
    pub fn finish(&self) {
        let count = self.count();
        let time = self.start.elapsed().as_secs_f64();
        debug!(
            "{}: finished {} examples in {:.2}s",
            self.label, count, time
        );
    }

    fn refresh(&self, count: usize, rate: f64) {
        match self.total {
            Some(total) => debug!(
                "{}: {}/{} examples ({:.0}/s)",
                self.label, count, total, rate
            ),
            None => debug!("{}: {} examples ({:.0}/s)", self.label, count, rate),
        }
    }
}

#[test]
fn test_progress_counts() {
    let pb = ProgressHandle::new("test", Some(100));
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..25 {
                    pb.advance(1);
                }
            });
        }
    });
    assert_eq!(pb.count(), 100);
    pb.finish();
}
