//! Registry package documents (the subset needed to find a version's tarball).

use serde::Deserialize;
use std::collections::HashMap;

use super::error::TransportError;

/// Abbreviated package document served at `<registry>/<name>`.
#[derive(Debug, Deserialize)]
pub struct PackageDocument {
    #[serde(default)]
    pub versions: HashMap<String, VersionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct VersionEntry {
    pub dist: Dist,
}

#[derive(Debug, Deserialize)]
pub struct Dist {
    pub tarball: String,
}

/// Tarball location the registry publishes for `name@version`.
pub fn tarball_location(body: &[u8], name: &str, version: &str) -> Result<String, TransportError> {
    let doc: PackageDocument =
        serde_json::from_slice(body).map_err(|e| TransportError::InvalidMetadata {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    doc.versions
        .get(version)
        .map(|v| v.dist.tarball.clone())
        .ok_or_else(|| TransportError::NotPublished {
            name: name.to_string(),
            version: version.to_string(),
        })
}
