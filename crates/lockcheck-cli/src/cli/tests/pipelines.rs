//! Tests for the verify and fetch subcommands.

use super::parse;
use crate::cli::CliCommand;
use std::path::Path;

#[test]
fn cli_parse_verify_defaults() {
    match parse(&["lockcheck", "verify"]) {
        CliCommand::Verify {
            dir,
            registry,
            download,
            strict,
        } => {
            assert_eq!(dir, Path::new("."));
            assert!(registry.registry.is_none());
            assert!(registry.concurrency.is_none());
            assert!(!registry.fail_fast);
            assert!(!download);
            assert!(!strict);
        }
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_verify_all_flags() {
    match parse(&[
        "lockcheck",
        "verify",
        "/work/app",
        "--registry",
        "https://npm.internal.example",
        "--download",
        "--strict",
        "--fail-fast",
        "--concurrency",
        "4",
        "--user",
        "ci",
    ]) {
        CliCommand::Verify {
            dir,
            registry,
            download,
            strict,
        } => {
            assert_eq!(dir, Path::new("/work/app"));
            assert_eq!(
                registry.registry.as_deref(),
                Some("https://npm.internal.example")
            );
            assert_eq!(registry.concurrency, Some(4));
            assert_eq!(registry.user.as_deref(), Some("ci"));
            assert!(registry.fail_fast);
            assert!(download);
            assert!(strict);
        }
        _ => panic!("expected Verify with flags"),
    }
}

#[test]
fn cli_parse_fetch() {
    match parse(&["lockcheck", "fetch", "proj", "--fail-fast"]) {
        CliCommand::Fetch { dir, registry } => {
            assert_eq!(dir, Path::new("proj"));
            assert!(registry.fail_fast);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_rejects_verify_only_flags() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["lockcheck", "fetch", "--strict"]).is_err());
    assert!(crate::cli::Cli::try_parse_from(["lockcheck", "verify", "--concurrency", "x"]).is_err());
}
