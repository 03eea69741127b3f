//! In-memory reporter, useful for embedding and tests.

use std::fmt;
use std::sync::Mutex;

use super::ProgressReporter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    StageStart(String),
    ItemDone {
        title: String,
        completed: usize,
        total: usize,
    },
    StageSucceeded(String),
    StageFailed { title: String, error: String },
    StageSkipped(String),
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// `(completed, total)` pairs reported for one stage.
    pub fn items_for(&self, title: &str) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::ItemDone {
                    title: t,
                    completed,
                    total,
                } if t == title => Some((completed, total)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl ProgressReporter for RecordingReporter {
    fn stage_start(&self, title: &str) {
        self.push(ProgressEvent::StageStart(title.to_string()));
    }

    fn item_done(&self, title: &str, completed: usize, total: usize) {
        self.push(ProgressEvent::ItemDone {
            title: title.to_string(),
            completed,
            total,
        });
    }

    fn stage_succeeded(&self, title: &str) {
        self.push(ProgressEvent::StageSucceeded(title.to_string()));
    }

    fn stage_failed(&self, title: &str, error: &dyn fmt::Display) {
        self.push(ProgressEvent::StageFailed {
            title: title.to_string(),
            error: error.to_string(),
        });
    }

    fn stage_skipped(&self, title: &str) {
        self.push(ProgressEvent::StageSkipped(title.to_string()));
    }
}
