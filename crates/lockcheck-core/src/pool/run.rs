//! The pool's run loop: keep the window full, settle items, drain.

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};

use super::report::{ItemFailure, PoolProgress, PoolRunReport};
use super::{PoolHandle, WorkerPool};

impl<I> WorkerPool<I>
where
    I: Clone + Send + 'static,
{
    /// Run `task` over the backlog until it drains. Continues past every failure.
    pub async fn run<F, Fut, E>(self, task: F) -> PoolRunReport<I, E>
    where
        F: FnMut(I, PoolHandle<I>) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
    {
        self.run_until(task, |_: &PoolRunReport<I, E>| false).await
    }

    /// Like [`run`](Self::run), but after each failure `abort_when` is asked
    /// whether to stop. Once it returns true no further items start; items
    /// already running are awaited and recorded before returning.
    pub async fn run_until<F, Fut, E, A>(self, mut task: F, abort_when: A) -> PoolRunReport<I, E>
    where
        F: FnMut(I, PoolHandle<I>) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
        A: Fn(&PoolRunReport<I, E>) -> bool,
    {
        let WorkerPool {
            width,
            task_timeout,
            mut on_item_done,
            handle,
        } = self;

        // The loop is the only writer of `report`; tasks only touch the backlog.
        let mut report = PoolRunReport::new();
        let mut in_flight = JoinSet::new();
        let mut stopping = false;

        loop {
            while !stopping && in_flight.len() < width {
                let Some(item) = handle.pop() else {
                    break;
                };
                let fut = task(item.clone(), handle.clone());
                in_flight.spawn(settle(item, fut, task_timeout));
            }

            // Nothing in flight after a refill attempt means the backlog is drained
            // (or we are stopping).
            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            report.completed += 1;
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((item, Err(failure))) => {
                    report.failed.push((item, failure));
                    if !stopping && abort_when(&report) {
                        tracing::debug!(
                            completed = report.completed,
                            failed = report.failed.len(),
                            "abort predicate fired; draining in-flight items"
                        );
                        stopping = true;
                    }
                }
                Err(e) => {
                    // `settle` absorbs task panics, so this is runtime shutdown.
                    tracing::error!("pool slot lost: {}", e);
                }
            }

            if let Some(cb) = on_item_done.as_mut() {
                cb(PoolProgress {
                    completed: report.completed,
                    total: handle.submitted(),
                });
            }
        }

        report.not_started = handle.take_pending();
        report.total_submitted = handle.submitted();
        report.aborted = stopping;
        report
    }
}

/// Run one item's future to completion on its own task so a panic or a
/// timeout is attributed to the item instead of tearing down the pool.
async fn settle<I, E, Fut>(
    item: I,
    fut: Fut,
    timeout: Option<Duration>,
) -> (I, Result<(), ItemFailure<E>>)
where
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    let mut task = tokio::spawn(fut);
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                task.abort();
                return (item, Err(ItemFailure::TimedOut(limit)));
            }
        },
        None => task.await,
    };
    let result = match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ItemFailure::Task(e)),
        Err(e) => Err(ItemFailure::Panicked(join_error_message(e))),
    };
    (item, result)
}

fn join_error_message(e: JoinError) -> String {
    if e.is_cancelled() {
        return "cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = e.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
