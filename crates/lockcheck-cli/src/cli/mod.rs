//! CLI for lockcheck.

mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lockcheck_core::config;
use lockcheck_core::integrity::Algorithm;
use std::path::PathBuf;

use commands::{run_fetch, run_integrity, run_verify};

/// Top-level CLI for lockcheck.
#[derive(Debug, Parser)]
#[command(name = "lockcheck", version)]
#[command(
    about = "Verify and pre-fetch the packages pinned in package-lock.json",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Registry and pool flags shared by `verify` and `fetch`.
#[derive(Debug, Clone, Default, Args)]
pub struct RegistryArgs {
    /// Registry to query and download from (overrides the config file).
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Process up to N dependencies at once (overrides the config file).
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Stop downloading after the first package that fails.
    #[arg(long)]
    pub fail_fast: bool,

    /// Registry user for basic auth. The password is read from LOCKCHECK_PASSWORD.
    #[arg(long, env = "LOCKCHECK_USER", value_name = "USER")]
    pub user: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check every locked package against the registry.
    Verify {
        /// Project directory containing package-lock.json.
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        registry: RegistryArgs,

        /// Also download every package after verifying.
        #[arg(long)]
        download: bool,

        /// Fail before downloading if any package fails verification.
        #[arg(long)]
        strict: bool,
    },

    /// Download every locked package without verifying it first.
    Fetch {
        /// Project directory containing package-lock.json.
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Print the integrity (SRI) string of a local file.
    Integrity {
        /// Path to the file.
        path: PathBuf,

        /// Digest algorithm: sha256, sha384 or sha512.
        #[arg(long, default_value = "sha512")]
        algorithm: Algorithm,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Verify {
                dir,
                registry,
                download,
                strict,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_verify(&cfg, &dir, &registry, download, strict).await?;
            }
            CliCommand::Fetch { dir, registry } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(&cfg, &dir, &registry).await?;
            }
            CliCommand::Integrity { path, algorithm } => run_integrity(&path, algorithm)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
