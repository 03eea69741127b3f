//! `lockcheck verify` – check locked packages against the registry.

use anyhow::Result;
use lockcheck_core::config::LockcheckConfig;
use lockcheck_core::pipeline::Pipeline;
use std::path::Path;

use super::{pipeline_options, run_pipeline};
use crate::cli::RegistryArgs;

pub async fn run_verify(
    cfg: &LockcheckConfig,
    dir: &Path,
    args: &RegistryArgs,
    download: bool,
    strict: bool,
) -> Result<()> {
    let pipeline = Pipeline::verify(pipeline_options(cfg, args, strict), download);
    run_pipeline(pipeline, cfg, dir, args).await
}
