//! Units of work submitted to the pool, one per dependency key.

mod error;
mod fetch;
mod verify;

use std::sync::Arc;

use crate::manifest::{DependencyRecord, ParsedManifest};
use crate::pool::ItemFailure;

pub use error::{DependencyError, FailureKind};
pub use fetch::fetch_dependency;
pub use verify::verify_dependency;

/// Failure category of a pool-recorded item failure.
pub fn failure_kind(failure: &ItemFailure<DependencyError>) -> FailureKind {
    match failure {
        ItemFailure::Task(e) => e.kind(),
        ItemFailure::Panicked(_) => FailureKind::Panicked,
        ItemFailure::TimedOut(_) => FailureKind::TimedOut,
    }
}

fn record<'a>(
    manifest: &'a Arc<ParsedManifest>,
    key: &str,
) -> Result<&'a DependencyRecord, DependencyError> {
    manifest.get(key).ok_or(DependencyError::NotFound)
}

#[cfg(test)]
pub(crate) mod testing;
