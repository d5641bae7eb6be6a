// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Worker thread pools and panic-safe task batches.
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::*;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::errors::TrainingError;

/// Build a dedicated pool with exactly `n_threads` workers.
pub fn worker_pool(n_threads: usize) -> Result<ThreadPool, TrainingError> {
    if n_threads == 0 {
        return Err(TrainingError::NoWorkers);
    }
    debug!("initializing training thread pool with {} threads", n_threads);
    let pool = ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("pltr-worker-{}", i))
        .build()?;
    Ok(pool)
}

/// Run a batch of tasks on `pool` and wait for all of them.
///
/// Returns once every task has finished, so writes made by one batch are
/// visible to the next. If any task panics, the panic message is returned
/// instead of the results.
pub(crate) fn run_tasks<T, R, F>(pool: &ThreadPool, tasks: Vec<T>, work: F) -> Result<Vec<R>, String>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    catch_unwind(AssertUnwindSafe(|| {
        pool.install(|| tasks.into_par_iter().map(&work).collect())
    }))
    .map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(feature = "python")]
mod py_pool {
    use log::*;
    use pyo3::{exceptions::PyRuntimeError, prelude::*};
    use rayon::{current_num_threads, ThreadPoolBuilder};

    #[pyfunction]
    pub fn init_accel_pool(n_threads: usize) -> PyResult<()> {
        debug!(
            "initializing accelerator thread pool with {} threads",
            n_threads
        );
        ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build_global()
            .map_err(|_| PyErr::new::<PyRuntimeError, _>("Rayon initialization error"))
    }

    #[pyfunction]
    pub fn thread_count() -> PyResult<usize> {
        Ok(current_num_threads())
    }
}

#[cfg(feature = "python")]
pub use py_pool::{init_accel_pool, thread_count};

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_pool_size() {
        let pool = worker_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
        assert!(matches!(worker_pool(0), Err(TrainingError::NoWorkers)));
    }

    #[test]
    fn test_run_tasks_order() {
        let pool = worker_pool(4).unwrap();
        let out = run_tasks(&pool, (0..16).collect(), |x: i32| x * 2).unwrap();
        assert_eq!(out, (0..16).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_tasks_all_finish() {
        let pool = worker_pool(2).unwrap();
        let count = AtomicUsize::new(0);
        run_tasks(&pool, vec![(); 10], |_| {
            count.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_run_tasks_panic() {
        let pool = worker_pool(2).unwrap();
        let res = run_tasks(&pool, vec![1, 2, 3], |x: i32| {
            if x == 2 {
                panic!("bad task {}", x);
            }
            x
        });
        assert_eq!(res.unwrap_err(), "bad task 2");
    }
}
