//! Verification of one dependency against the registry.

use std::sync::Arc;

use crate::artifact::is_valid_artifact_reference;
use crate::manifest::ParsedManifest;
use crate::pool::PoolHandle;
use crate::registry::MetadataClient;

use super::error::DependencyError;

/// Check one dependency: the declared location must be a package artifact,
/// the registry must know the version, and what it publishes must be a
/// package artifact too.
///
/// Keys nested under this dependency are submitted to `backlog` as soon as the
/// record is found, so they are verified even when this one fails.
pub async fn verify_dependency(
    key: String,
    manifest: Arc<ParsedManifest>,
    client: Arc<dyn MetadataClient>,
    backlog: PoolHandle<String>,
) -> Result<(), DependencyError> {
    let record = super::record(&manifest, &key)?;
    if !record.nested.is_empty() {
        backlog.submit(record.nested.iter().cloned());
    }

    if !is_valid_artifact_reference(&record.declared_location) {
        return Err(DependencyError::MalformedLocalReference {
            location: record.declared_location.clone(),
        });
    }

    let remote = client
        .lookup(&record.package_name, &record.declared_version)
        .await
        .map_err(DependencyError::RemoteLookup)?;

    if !is_valid_artifact_reference(&remote) {
        return Err(DependencyError::CorruptRemoteArtifact { location: remote });
    }

    if remote != record.declared_location {
        tracing::debug!(
            dependency = %key,
            declared = %record.declared_location,
            remote = %remote,
            "registry location differs from manifest"
        );
    }
    Ok(())
}
