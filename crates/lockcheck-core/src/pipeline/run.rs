//! Stage dispatch and the state transitions of one run.

use std::sync::Arc;

use crate::manifest::{self, ParsedManifest};
use crate::pool::{PoolHandle, PoolRunReport, WorkerPool};
use crate::progress::ProgressReporter;
use crate::task::{fetch_dependency, verify_dependency, DependencyError};

use super::context::RunContext;
use super::error::StageError;
use super::stage::Stage;
use super::summary::{PipelineOutcome, PipelineState, StageSummary};
use super::{Collaborators, Pipeline};

type DependencyReport = PoolRunReport<String, DependencyError>;

impl Pipeline {
    /// Run every planned stage in order against `ctx`.
    ///
    /// The first stage error aborts the run and later stages are not reached.
    /// A pooled stage whose items fail but whose stage error is not raised
    /// (no strict mode, no fail-fast) still succeeds.
    pub async fn run(&self, ctx: &mut RunContext, deps: &Collaborators) -> PipelineOutcome {
        let mut state = PipelineState::Pending;
        let mut stages = Vec::with_capacity(self.stages.len());

        for (index, planned) in self.stages.iter().enumerate() {
            let stage = planned.stage;
            if planned.skip {
                tracing::info!(%stage, "skipped");
                deps.reporter.stage_skipped(stage.title());
                stages.push(StageSummary::skipped(stage));
                continue;
            }

            enter(&mut state, PipelineState::Running(index));
            deps.reporter.stage_start(stage.title());

            match self.run_stage(stage, ctx, deps, &mut stages).await {
                Ok(()) => deps.reporter.stage_succeeded(stage.title()),
                Err(error) => {
                    tracing::error!(%stage, "stage failed: {}", error);
                    deps.reporter.stage_failed(stage.title(), &error);
                    enter(&mut state, PipelineState::Aborted { stage, error });
                    return PipelineOutcome { state, stages };
                }
            }
        }

        enter(&mut state, PipelineState::Succeeded);
        PipelineOutcome { state, stages }
    }

    /// Pushes the stage's summary before returning, including on error.
    async fn run_stage(
        &self,
        stage: Stage,
        ctx: &mut RunContext,
        deps: &Collaborators,
        summaries: &mut Vec<StageSummary>,
    ) -> Result<(), StageError> {
        match stage {
            Stage::Locate => {
                let located = manifest::locate_manifest(&ctx.project_path);
                summaries.push(StageSummary::plain(stage));
                let path = located?;
                tracing::info!(path = %path.display(), "found manifest");
                ctx.manifest_path = Some(path);
            }
            Stage::Parse => {
                let parsed = ctx
                    .manifest_path()
                    .and_then(manifest::load_manifest);
                summaries.push(StageSummary::plain(stage));
                let parsed = parsed?;
                tracing::info!(
                    dependencies = parsed.len(),
                    roots = parsed.roots().len(),
                    lockfile_version = parsed.lockfile_version,
                    "manifest parsed"
                );
                ctx.manifest = Some(Arc::new(parsed));
            }
            Stage::Verify => {
                let manifest = match ctx.manifest() {
                    Ok(m) => m,
                    Err(e) => {
                        summaries.push(StageSummary::plain(stage));
                        return Err(e.into());
                    }
                };
                let report = self.verify_all(manifest, deps).await;
                let summary = StageSummary::from_report(stage, &report);
                log_failures(&summary);
                let failed = summary.failures.len();
                summaries.push(summary);
                if self.options.strict && failed > 0 {
                    return Err(StageError::StrictVerification { failed });
                }
            }
            Stage::Fetch => {
                let manifest = match ctx.manifest() {
                    Ok(m) => m,
                    Err(e) => {
                        summaries.push(StageSummary::plain(stage));
                        return Err(e.into());
                    }
                };
                let report = self.fetch_all(manifest, deps).await;
                let summary = StageSummary::from_report(stage, &report);
                log_failures(&summary);
                summaries.push(summary);
                if report.aborted {
                    return Err(StageError::Aborted {
                        failed: report.failed.len(),
                        not_started: report.not_started.len(),
                    });
                }
            }
        }
        Ok(())
    }

    fn pool(&self, stage: Stage, reporter: &Arc<dyn ProgressReporter>) -> WorkerPool<String> {
        let reporter = Arc::clone(reporter);
        let title = stage.title();
        WorkerPool::new(self.options.concurrency)
            .with_task_timeout(self.options.task_timeout)
            .on_item_done(move |p| reporter.item_done(title, p.completed, p.total))
    }

    /// Seeds the top-level keys; nested keys are submitted by the tasks.
    async fn verify_all(&self, manifest: Arc<ParsedManifest>, deps: &Collaborators) -> DependencyReport {
        let pool = self.pool(Stage::Verify, &deps.reporter);
        pool.submit(manifest.roots().iter().cloned());
        let client = Arc::clone(&deps.metadata);
        pool.run(move |key, backlog| {
            verify_dependency(key, Arc::clone(&manifest), Arc::clone(&client), backlog)
        })
        .await
    }

    async fn fetch_all(&self, manifest: Arc<ParsedManifest>, deps: &Collaborators) -> DependencyReport {
        let pool = self.pool(Stage::Fetch, &deps.reporter);
        pool.submit(manifest.keys().map(str::to_string));
        let fetcher = Arc::clone(&deps.fetcher);
        let task = move |key: String, _: PoolHandle<String>| {
            fetch_dependency(key, Arc::clone(&manifest), Arc::clone(&fetcher))
        };
        if self.options.fail_fast {
            pool.run_until(task, |r: &DependencyReport| !r.failed.is_empty())
                .await
        } else {
            pool.run(task).await
        }
    }
}

fn enter(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = ?state, to = ?next, "pipeline transition");
    *state = next;
}

fn log_failures(summary: &StageSummary) {
    for f in &summary.failures {
        tracing::warn!(
            stage = %summary.stage,
            dependency = %f.key,
            kind = f.kind.as_str(),
            "{}",
            f.message
        );
    }
    if let Some(counts) = summary.counts {
        tracing::info!(
            stage = %summary.stage,
            total = counts.total,
            succeeded = counts.succeeded(),
            failed = counts.failed,
            not_started = counts.not_started,
            "stage finished"
        );
    }
}
