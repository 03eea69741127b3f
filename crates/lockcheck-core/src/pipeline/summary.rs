//! What a run produced: final state plus per-stage results.

use crate::pool::{ItemFailure, PoolRunReport};
use crate::task::{failure_kind, DependencyError, FailureKind};

use super::error::StageError;
use super::stage::Stage;

/// One dependency that failed in a pooled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDependency {
    pub key: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageCounts {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub not_started: usize,
}

impl StageCounts {
    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: Stage,
    pub skipped: bool,
    /// Present for pooled stages that ran.
    pub counts: Option<StageCounts>,
    /// Sorted by key so repeated runs compare equal.
    pub failures: Vec<FailedDependency>,
}

impl StageSummary {
    pub(super) fn plain(stage: Stage) -> Self {
        Self {
            stage,
            skipped: false,
            counts: None,
            failures: Vec::new(),
        }
    }

    pub(super) fn skipped(stage: Stage) -> Self {
        Self {
            skipped: true,
            ..Self::plain(stage)
        }
    }

    pub(super) fn from_report(
        stage: Stage,
        report: &PoolRunReport<String, DependencyError>,
    ) -> Self {
        let mut failures: Vec<FailedDependency> = report
            .failed
            .iter()
            .map(|(key, failure)| FailedDependency {
                key: key.clone(),
                kind: failure_kind(failure),
                message: failure_message(failure),
            })
            .collect();
        failures.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            stage,
            skipped: false,
            counts: Some(StageCounts {
                total: report.total_submitted,
                completed: report.completed,
                failed: report.failed.len(),
                not_started: report.not_started.len(),
            }),
            failures,
        }
    }
}

/// Error text including the source chain (`registry lookup failed: HTTP 500 from …`).
fn failure_message(failure: &ItemFailure<DependencyError>) -> String {
    let mut msg = failure.to_string();
    if let ItemFailure::Task(e) = failure {
        let mut source = std::error::Error::source(e);
        while let Some(s) = source {
            let text = s.to_string();
            if !msg.contains(&text) {
                msg.push_str(": ");
                msg.push_str(&text);
            }
            source = s.source();
        }
    }
    msg
}

/// Orchestrator state machine.
#[derive(Debug)]
pub enum PipelineState {
    Pending,
    Running(usize),
    Succeeded,
    Aborted { stage: Stage, error: StageError },
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    /// One entry per stage that was reached, in run order.
    pub stages: Vec<StageSummary>,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.state, PipelineState::Succeeded)
    }

    pub fn error(&self) -> Option<&StageError> {
        match &self.state {
            PipelineState::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn summary(&self, stage: Stage) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Every per-dependency failure across all stages, in stage order.
    pub fn failures(&self) -> impl Iterator<Item = (Stage, &FailedDependency)> {
        self.stages
            .iter()
            .flat_map(|s| s.failures.iter().map(move |f| (s.stage, f)))
    }

    pub fn failure_count(&self) -> usize {
        self.stages.iter().map(|s| s.failures.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TransportError;

    #[test]
    fn failure_message_includes_source_once() {
        let failure = ItemFailure::Task(DependencyError::RemoteLookup(TransportError::Http {
            url: "https://r/x".into(),
            status: 500,
        }));
        let msg = failure_message(&failure);
        assert_eq!(msg, "registry lookup failed: HTTP 500 from https://r/x");
    }

    #[test]
    fn outcome_accessors() {
        let outcome = PipelineOutcome {
            state: PipelineState::Succeeded,
            stages: vec![
                StageSummary::plain(Stage::Locate),
                StageSummary {
                    failures: vec![FailedDependency {
                        key: "a".into(),
                        kind: FailureKind::Fetch,
                        message: "fetch failed".into(),
                    }],
                    ..StageSummary::plain(Stage::Fetch)
                },
            ],
        };
        assert!(outcome.is_success());
        assert!(outcome.error().is_none());
        assert_eq!(outcome.failure_count(), 1);
        let (stage, f) = outcome.failures().next().unwrap();
        assert_eq!(stage, Stage::Fetch);
        assert_eq!(f.key, "a");
        assert!(outcome.summary(Stage::Verify).is_none());
    }
}
