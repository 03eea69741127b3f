//! Progress reporting sink for pipeline stages.
//!
//! The orchestrator and pool-backed stages receive a reporter explicitly
//! (`Arc<dyn ProgressReporter>`); nothing renders progress through global
//! state. The CLI provides a terminal reporter; [`LogReporter`] and
//! [`RecordingReporter`] cover headless use and tests.

mod record;

use std::fmt;

pub use record::{ProgressEvent, RecordingReporter};

/// Receives stage lifecycle and per-item completion events.
///
/// `item_done` is called from the pool's run loop, once per settled item,
/// with a consistent `(completed, total)` snapshot.
pub trait ProgressReporter: Send + Sync {
    fn stage_start(&self, title: &str);
    fn item_done(&self, title: &str, completed: usize, total: usize);
    fn stage_succeeded(&self, title: &str);
    fn stage_failed(&self, title: &str, error: &dyn fmt::Display);
    fn stage_skipped(&self, _title: &str) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn stage_start(&self, _title: &str) {}
    fn item_done(&self, _title: &str, _completed: usize, _total: usize) {}
    fn stage_succeeded(&self, _title: &str) {}
    fn stage_failed(&self, _title: &str, _error: &dyn fmt::Display) {}
}

/// Forwards events to `tracing`. Item events are logged at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn stage_start(&self, title: &str) {
        tracing::info!(stage = title, "stage started");
    }

    fn item_done(&self, title: &str, completed: usize, total: usize) {
        tracing::trace!(stage = title, completed, total, "item done");
    }

    fn stage_succeeded(&self, title: &str) {
        tracing::info!(stage = title, "stage succeeded");
    }

    fn stage_failed(&self, title: &str, error: &dyn fmt::Display) {
        tracing::warn!(stage = title, error = %error, "stage failed");
    }

    fn stage_skipped(&self, title: &str) {
        tracing::info!(stage = title, "stage skipped");
    }
}
