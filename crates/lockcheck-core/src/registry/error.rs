//! Transport and fetch errors for registry calls.

use thiserror::Error;

use crate::integrity::IntegrityError;

/// Failure talking to the registry or downloading from it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u32 },

    #[error("{name}@{version} is not published on the registry")]
    NotPublished { name: String, version: String },

    #[error("invalid registry metadata for {name}: {reason}")]
    InvalidMetadata { name: String, reason: String },

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("transfer task failed: {0}")]
    Join(String),
}

/// Failure fetching one artifact.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),
}
