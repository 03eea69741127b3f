//! Pipeline orchestrator.
//!
//! Runs an ordered list of stages (locate → parse → verify → fetch) against a
//! shared [`RunContext`]. Skips are decided before the run starts. A stage
//! error aborts the run; per-dependency failures inside the pooled stages are
//! collected into the outcome and the next stage still runs.

mod context;
mod error;
mod run;
mod stage;
mod summary;

use std::sync::Arc;
use std::time::Duration;

use crate::pool::DEFAULT_POOL_WIDTH;
use crate::progress::ProgressReporter;
use crate::registry::{ArtifactFetcher, MetadataClient, RegistryClient};

pub use context::RunContext;
pub use error::StageError;
pub use stage::{PlannedStage, Stage};
pub use summary::{
    FailedDependency, PipelineOutcome, PipelineState, StageCounts, StageSummary,
};

/// Knobs resolved from CLI flags and config before the run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Pool width for the verify and fetch stages.
    pub concurrency: usize,
    /// Per-dependency time limit.
    pub task_timeout: Option<Duration>,
    /// Abort the fetch stage at the first failed download.
    pub fail_fast: bool,
    /// Abort before fetching when any dependency fails verification.
    pub strict: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_POOL_WIDTH,
            task_timeout: None,
            fail_fast: false,
            strict: false,
        }
    }
}

/// External collaborators, injected.
#[derive(Clone)]
pub struct Collaborators {
    pub metadata: Arc<dyn MetadataClient>,
    pub fetcher: Arc<dyn ArtifactFetcher>,
    pub reporter: Arc<dyn ProgressReporter>,
}

impl Collaborators {
    /// Use one registry client for both lookups and downloads.
    pub fn registry(client: RegistryClient, reporter: Arc<dyn ProgressReporter>) -> Self {
        let client = Arc::new(client);
        Self {
            metadata: client.clone(),
            fetcher: client,
            reporter,
        }
    }
}

/// An ordered stage plan plus the options its pooled stages run with.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<PlannedStage>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Stages run in the given order; each may only read context populated by an earlier one.
    pub fn new(stages: Vec<PlannedStage>, options: PipelineOptions) -> Self {
        Self { stages, options }
    }

    /// Verify every dependency; download them too when `download` is set.
    pub fn verify(options: PipelineOptions, download: bool) -> Self {
        Self::new(
            vec![
                PlannedStage::run(Stage::Locate),
                PlannedStage::run(Stage::Parse),
                PlannedStage::run(Stage::Verify),
                PlannedStage::skip_if(Stage::Fetch, !download),
            ],
            options,
        )
    }

    /// Download every dependency without verifying it first.
    pub fn fetch(options: PipelineOptions) -> Self {
        Self::new(
            vec![
                PlannedStage::run(Stage::Locate),
                PlannedStage::run(Stage::Parse),
                PlannedStage::skip_if(Stage::Verify, true),
                PlannedStage::run(Stage::Fetch),
            ],
            options,
        )
    }

    pub fn stages(&self) -> &[PlannedStage] {
        &self.stages
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}
