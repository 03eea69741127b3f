//! Structural errors: the manifest is missing, unreadable, or not a lockfile.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure that makes the whole run meaningless. Always aborts the pipeline.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("no package-lock.json found at {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has neither a `dependencies` nor a `packages` object", path.display())]
    NoDependencies { path: PathBuf },

    /// A stage ran before the stage that populates the field it needs.
    #[error("run context has no {0}; an earlier stage did not complete")]
    MissingContext(&'static str),
}
