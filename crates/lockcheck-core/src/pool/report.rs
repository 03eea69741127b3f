//! Per-run accounting for the worker pool.

use std::time::Duration;
use thiserror::Error;

/// Why one item did not succeed.
#[derive(Debug, Error)]
pub enum ItemFailure<E> {
    /// The task returned an error.
    #[error("{0}")]
    Task(E),
    /// The task panicked; the payload message is kept when it is a string.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The task exceeded the pool's per-task time limit.
    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

impl<E> ItemFailure<E> {
    /// The task's own error, if that is what failed.
    pub fn task_error(&self) -> Option<&E> {
        match self {
            ItemFailure::Task(e) => Some(e),
            _ => None,
        }
    }
}

/// Snapshot passed to the per-item progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolProgress {
    /// Items settled so far (success or failure).
    pub completed: usize,
    /// Items submitted so far; grows when tasks submit more work.
    pub total: usize,
}

impl PoolProgress {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).floor() as u8
    }
}

/// Outcome of one pool run.
///
/// At return, `completed + not_started.len() == total_submitted`;
/// `not_started` is only non-empty when the abort predicate fired.
#[derive(Debug)]
pub struct PoolRunReport<I, E> {
    pub total_submitted: usize,
    pub completed: usize,
    /// Failures in settlement order.
    pub failed: Vec<(I, ItemFailure<E>)>,
    /// Items left in the backlog after a graceful stop.
    pub not_started: Vec<I>,
    /// True if the abort predicate stopped the run early.
    pub aborted: bool,
}

impl<I, E> PoolRunReport<I, E> {
    pub(super) fn new() -> Self {
        Self {
            total_submitted: 0,
            completed: 0,
            failed: Vec::new(),
            not_started: Vec::new(),
            aborted: false,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.completed - self.failed.len()
    }

    /// Every submitted item ran and none failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.aborted && self.completed == self.total_submitted
    }

    pub fn progress(&self) -> PoolProgress {
        PoolProgress {
            completed: self.completed,
            total: self.total_submitted,
        }
    }
}
