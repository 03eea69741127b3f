//! `lockcheck fetch` – download every locked package.

use anyhow::Result;
use lockcheck_core::config::LockcheckConfig;
use lockcheck_core::pipeline::Pipeline;
use std::path::Path;

use super::{pipeline_options, run_pipeline};
use crate::cli::RegistryArgs;

pub async fn run_fetch(cfg: &LockcheckConfig, dir: &Path, args: &RegistryArgs) -> Result<()> {
    let pipeline = Pipeline::fetch(pipeline_options(cfg, args, false));
    run_pipeline(pipeline, cfg, dir, args).await
}
