//! Fetching one dependency's artifact.

use std::sync::Arc;

use crate::manifest::ParsedManifest;
use crate::registry::ArtifactFetcher;

use super::error::DependencyError;

/// Download the dependency's declared artifact through `fetcher` and discard it.
pub async fn fetch_dependency(
    key: String,
    manifest: Arc<ParsedManifest>,
    fetcher: Arc<dyn ArtifactFetcher>,
) -> Result<(), DependencyError> {
    let record = super::record(&manifest, &key)?;
    let bytes = fetcher
        .fetch(&record.declared_location, record.integrity.as_deref())
        .await
        .map_err(DependencyError::Fetch)?;
    tracing::debug!(dependency = %key, bytes, "fetched");
    Ok(())
}
