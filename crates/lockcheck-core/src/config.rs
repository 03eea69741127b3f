use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::registry::DEFAULT_REGISTRY;

/// Retry policy for registry calls (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per call (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/lockcheck/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockcheckConfig {
    /// Registry queried for metadata and used for downloads.
    pub registry: String,
    /// Maximum number of dependencies checked or fetched at once.
    pub concurrency: usize,
    /// Per-dependency time limit in seconds. 0 waits indefinitely.
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: Option<u64>,
    /// Check fetched artifacts against the manifest's integrity digest.
    #[serde(default = "default_true")]
    pub verify_integrity: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_true() -> bool {
    true
}

const DEFAULT_TASK_TIMEOUT_SECS: u64 = 300;

fn default_task_timeout() -> Option<u64> {
    Some(DEFAULT_TASK_TIMEOUT_SECS)
}

impl Default for LockcheckConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            concurrency: 10,
            task_timeout_secs: default_task_timeout(),
            verify_integrity: true,
            retry: None,
        }
    }
}

impl LockcheckConfig {
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("lockcheck")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LockcheckConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = LockcheckConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: LockcheckConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = LockcheckConfig::default();
        assert_eq!(cfg.registry, "https://registry.npmjs.org");
        assert_eq!(cfg.concurrency, 10);
        assert_eq!(cfg.task_timeout(), Some(Duration::from_secs(300)));
        assert!(cfg.verify_integrity);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = LockcheckConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: LockcheckConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.registry, cfg.registry);
        assert_eq!(parsed.concurrency, cfg.concurrency);
        assert_eq!(parsed.task_timeout_secs, cfg.task_timeout_secs);
    }

    #[test]
    fn config_toml_minimal() {
        let toml = r#"
            registry = "https://artifactory.example.com/api/npm/npm"
            concurrency = 4
        "#;
        let cfg: LockcheckConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.task_timeout(), LockcheckConfig::default().task_timeout());
        assert!(cfg.verify_integrity);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn zero_task_timeout_disables_it() {
        let toml = r#"
            registry = "https://registry.npmjs.org"
            concurrency = 10
            task_timeout_secs = 0
        "#;
        let cfg: LockcheckConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.task_timeout(), None);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            registry = "https://registry.npmjs.org"
            concurrency = 16
            task_timeout_secs = 60
            verify_integrity = false

            [retry]
            max_attempts = 5
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: LockcheckConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.task_timeout(), Some(Duration::from_secs(60)));
        assert!(!cfg.verify_integrity);
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        assert_eq!(retry.max_delay_secs, 15);
    }
}
