//! Bounded-concurrency worker pool.
//!
//! Runs an async task per item with at most `width` tasks in flight. When a
//! task settles, its slot is refilled from the backlog straight away. Tasks
//! receive a [`PoolHandle`] and may submit more items while the run is in
//! progress, so a backlog that is discovered incrementally still drains
//! through the same window.
//!
//! Per-item failures (errors, panics, timeouts) are recorded in the
//! [`PoolRunReport`] and never stop sibling tasks. An optional abort predicate
//! turns failures into a graceful stop: no new items start, in-flight items
//! are awaited.

mod report;
mod run;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub use report::{ItemFailure, PoolProgress, PoolRunReport};

/// Default number of concurrently running tasks.
pub const DEFAULT_POOL_WIDTH: usize = 10;

#[derive(Debug)]
struct Backlog<I> {
    queue: VecDeque<I>,
    /// Items ever submitted (queued, running, or settled).
    submitted: usize,
}

/// Cloneable submitter for a pool's backlog.
#[derive(Debug)]
pub struct PoolHandle<I> {
    backlog: Arc<Mutex<Backlog<I>>>,
}

impl<I> Clone for PoolHandle<I> {
    fn clone(&self) -> Self {
        Self {
            backlog: Arc::clone(&self.backlog),
        }
    }
}

impl<I> PoolHandle<I> {
    fn new() -> Self {
        Self {
            backlog: Arc::new(Mutex::new(Backlog {
                queue: VecDeque::new(),
                submitted: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Backlog<I>> {
        // The guard is never held across an await or user code, so a poisoned
        // lock still holds a consistent backlog.
        self.backlog.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue items. Safe to call before the run or from inside a running task.
    pub fn submit<T: IntoIterator<Item = I>>(&self, items: T) {
        let mut backlog = self.lock();
        for item in items {
            backlog.queue.push_back(item);
            backlog.submitted += 1;
        }
    }

    pub fn submit_one(&self, item: I) {
        self.submit(std::iter::once(item));
    }

    /// Items waiting to start.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Items submitted so far.
    pub fn submitted(&self) -> usize {
        self.lock().submitted
    }

    fn pop(&self) -> Option<I> {
        self.lock().queue.pop_front()
    }

    fn take_pending(&self) -> Vec<I> {
        self.lock().queue.drain(..).collect()
    }
}

type ProgressCallback = Box<dyn FnMut(PoolProgress) + Send>;

/// Fixed-width pool over a backlog of items of type `I`.
pub struct WorkerPool<I> {
    width: usize,
    task_timeout: Option<Duration>,
    on_item_done: Option<ProgressCallback>,
    handle: PoolHandle<I>,
}

impl<I> WorkerPool<I> {
    /// A pool running at most `width` tasks at once (minimum 1).
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            task_timeout: None,
            on_item_done: None,
            handle: PoolHandle::new(),
        }
    }

    /// Fail any single task that runs longer than `limit`. `None` waits indefinitely.
    pub fn with_task_timeout(mut self, limit: Option<Duration>) -> Self {
        self.task_timeout = limit;
        self
    }

    /// Called exactly once per item, after it settles, with the running counts.
    pub fn on_item_done<F>(mut self, f: F) -> Self
    where
        F: FnMut(PoolProgress) + Send + 'static,
    {
        self.on_item_done = Some(Box::new(f));
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn submit<T: IntoIterator<Item = I>>(&self, items: T) {
        self.handle.submit(items);
    }

    pub fn handle(&self) -> PoolHandle<I> {
        self.handle.clone()
    }
}

impl<I> Default for WorkerPool<I> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_WIDTH)
    }
}
