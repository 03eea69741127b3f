//! Per-dependency errors. Recorded by the pool; never abort sibling tasks.

use thiserror::Error;

use crate::registry::{FetchError, TransportError};

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("not present in the manifest")]
    NotFound,

    #[error("declared location {location:?} is not a package artifact")]
    MalformedLocalReference { location: String },

    #[error("registry lookup failed: {0}")]
    RemoteLookup(#[source] TransportError),

    #[error("registry reports {location:?}, which is not a package artifact")]
    CorruptRemoteArtifact { location: String },

    #[error("fetch failed: {0}")]
    Fetch(#[source] FetchError),
}

/// Category of a per-item failure, for summaries and policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    NotFound,
    MalformedLocalReference,
    CorruptRemoteArtifact,
    RemoteLookup,
    Fetch,
    Panicked,
    TimedOut,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NotFound => "not-found",
            FailureKind::MalformedLocalReference => "malformed-local-reference",
            FailureKind::CorruptRemoteArtifact => "corrupt-remote-artifact",
            FailureKind::RemoteLookup => "remote-lookup",
            FailureKind::Fetch => "fetch",
            FailureKind::Panicked => "panicked",
            FailureKind::TimedOut => "timed-out",
        }
    }
}

impl DependencyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DependencyError::NotFound => FailureKind::NotFound,
            DependencyError::MalformedLocalReference { .. } => FailureKind::MalformedLocalReference,
            DependencyError::RemoteLookup(_) => FailureKind::RemoteLookup,
            DependencyError::CorruptRemoteArtifact { .. } => FailureKind::CorruptRemoteArtifact,
            DependencyError::Fetch(_) => FailureKind::Fetch,
        }
    }
}
