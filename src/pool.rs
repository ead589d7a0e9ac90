//! Bounded task pool.
//!
//! Each plugin invocation builds one [`TaskPool`], submits every task, and
//! gets control back only after all of them have finished. The worker count
//! is small and fixed, independent of how many tasks are submitted.

use crate::log;
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

/// A fixed-size worker pool with run-all-then-drain semantics.
pub struct TaskPool {
    pool: ThreadPool,
}

impl TaskPool {
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("folio-worker-{i}"))
            .build()
            .context("Failed to build worker pool")?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` over every item and return once the pool has drained.
    ///
    /// Results come back in item order; completion order is unspecified.
    pub fn run<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(task).collect())
    }

    /// Like [`run`](Self::run), but a failed task is logged against
    /// `describe(item)` and left out of the results. Siblings keep running.
    pub fn run_isolated<T, R, D, F>(&self, items: &[T], describe: D, task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        D: Fn(&T) -> String + Sync + Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        self.run(items, |item| match task(item) {
            Ok(result) => Some(result),
            Err(err) => {
                log!("error"; "{}: {:#}", describe(item), err);
                None
            }
        })
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
        time::Duration,
    };

    #[test]
    fn test_run_preserves_item_order() {
        let pool = TaskPool::new(2).unwrap();
        let items: Vec<u32> = (0..50).collect();

        let doubled = pool.run(&items, |n| n * 2);

        assert_eq!(doubled, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let pool = TaskPool::new(2).unwrap();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<usize> = (0..16).collect();

        pool.run(&items, |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            active.fetch_sub(1, Ordering::SeqCst);
        });

        assert_eq!(pool.workers(), 2);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_tasks_run_before_return() {
        let pool = TaskPool::new(3).unwrap();
        let done = AtomicUsize::new(0);
        let items = vec![(); 40];

        pool.run(&items, |_| {
            done.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(done.load(Ordering::SeqCst), 40);
    }

    #[test]
    fn test_run_isolated_skips_failures() {
        let pool = TaskPool::new(2).unwrap();
        let items: Vec<i32> = (1..=6).collect();

        let kept = pool.run_isolated(
            &items,
            |n| format!("item {n}"),
            |&n| {
                if n % 3 == 0 {
                    anyhow::bail!("multiple of three");
                }
                Ok(n)
            },
        );

        assert_eq!(kept, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(TaskPool::new(0).unwrap().workers(), 1);
    }
}
