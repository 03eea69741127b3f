//! CLI command handlers, one per file, plus the settings they share.

mod fetch;
mod integrity;
mod verify;

pub use fetch::run_fetch;
pub use integrity::run_integrity;
pub use verify::run_verify;

use anyhow::{Context, Result};
use lockcheck_core::config::LockcheckConfig;
use lockcheck_core::pipeline::{
    Collaborators, Pipeline, PipelineOptions, PipelineState, RunContext,
};
use lockcheck_core::registry::{Credentials, RegistryClient};
use lockcheck_core::retry::RetryPolicy;
use std::path::Path;
use std::sync::Arc;

use super::progress::ConsoleReporter;
use super::summary::render_summary;
use super::RegistryArgs;

pub(crate) const PASSWORD_ENV: &str = "LOCKCHECK_PASSWORD";

/// Flags win over the config file.
fn pipeline_options(cfg: &LockcheckConfig, args: &RegistryArgs, strict: bool) -> PipelineOptions {
    PipelineOptions {
        concurrency: args.concurrency.unwrap_or(cfg.concurrency),
        task_timeout: cfg.task_timeout(),
        fail_fast: args.fail_fast,
        strict,
    }
}

fn credentials(user: Option<&str>, password: Option<String>) -> Result<Option<Credentials>> {
    let Some(user) = user else {
        return Ok(None);
    };
    let password = password.with_context(|| format!("--user given but {} is not set", PASSWORD_ENV))?;
    Ok(Some(Credentials {
        user: user.to_string(),
        password,
    }))
}

fn registry_client(cfg: &LockcheckConfig, args: &RegistryArgs) -> Result<RegistryClient> {
    let registry = args.registry.as_deref().unwrap_or(&cfg.registry);
    let retry = cfg
        .retry
        .as_ref()
        .map(RetryPolicy::from)
        .unwrap_or_default();
    let client = RegistryClient::new(registry)
        .with_context(|| format!("invalid registry {:?}", registry))?
        .with_retry(retry)
        .with_integrity_check(cfg.verify_integrity)
        .with_credentials(credentials(
            args.user.as_deref(),
            std::env::var(PASSWORD_ENV).ok(),
        )?);
    Ok(client)
}

/// Run `pipeline` over `dir`, print the summary, and turn an aborted run into an error.
async fn run_pipeline(
    pipeline: Pipeline,
    cfg: &LockcheckConfig,
    dir: &Path,
    args: &RegistryArgs,
) -> Result<()> {
    let client = registry_client(cfg, args)?;
    tracing::info!(
        registry = client.registry(),
        dir = %dir.display(),
        concurrency = pipeline.options().concurrency,
        "starting run"
    );
    let deps = Collaborators::registry(client, Arc::new(ConsoleReporter::stderr()));
    let mut ctx = RunContext::new(dir);
    let outcome = pipeline.run(&mut ctx, &deps).await;

    print!("{}", render_summary(&outcome));

    match outcome.state {
        PipelineState::Aborted { stage, error } => {
            Err(anyhow::Error::new(error).context(format!("{} failed", stage.title())))
        }
        _ => Ok(()),
    }
}
