//! In-memory registry and manifest builders for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::integrity::{sri_for_bytes, Algorithm};
use crate::manifest::ParsedManifest;
use crate::registry::{
    ArtifactFetcher, FetchError, MetadataClient, TransportError, DEFAULT_REGISTRY,
};

pub(crate) const TARBALL_BYTES: &[u8] = b"tarball-bytes";

pub(crate) fn tarball_url(name: &str, version: &str) -> String {
    format!("{}/{}/-/{}-{}.tgz", DEFAULT_REGISTRY, name, name, version)
}

/// Manifest with one top-level entry per `(name, version)`.
pub(crate) fn manifest(entries: &[(&str, &str)]) -> Arc<ParsedManifest> {
    let deps: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(name, version)| {
            (
                name.to_string(),
                serde_json::json!({
                    "version": version,
                    "resolved": tarball_url(name, version),
                    "integrity": sri_for_bytes(TARBALL_BYTES, Algorithm::Sha512),
                }),
            )
        })
        .collect();
    let doc = serde_json::json!({ "lockfileVersion": 1, "dependencies": deps });
    Arc::new(ParsedManifest::from_json_str(&doc.to_string(), Path::new("package-lock.json")).unwrap())
}

#[derive(Default)]
pub(crate) struct StaticRegistry {
    locations: HashMap<String, String>,
    failing: HashSet<String>,
    lookups: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl StaticRegistry {
    /// Publishes every manifest entry at its declared location.
    pub(crate) fn mirroring(m: &ParsedManifest) -> Self {
        let mut r = Self::default();
        for key in m.keys() {
            let rec = m.get(key).unwrap();
            r.locations
                .insert(rec.package_name.clone(), rec.declared_location.clone());
        }
        r
    }

    pub(crate) fn with(mut self, name: &str, location: &str) -> Self {
        self.locations.insert(name.to_string(), location.to_string());
        self
    }

    pub(crate) fn failing_fetch(mut self, name: &str) -> Self {
        let location = self.locations[name].clone();
        self.failing.insert(location);
        self
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataClient for StaticRegistry {
    async fn lookup(&self, name: &str, version: &str) -> Result<String, TransportError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.locations
            .get(name)
            .cloned()
            .ok_or_else(|| TransportError::NotPublished {
                name: name.to_string(),
                version: version.to_string(),
            })
    }
}

#[async_trait]
impl ArtifactFetcher for StaticRegistry {
    async fn fetch(&self, location: &str, _integrity: Option<&str>) -> Result<u64, FetchError> {
        self.fetched.lock().unwrap().push(location.to_string());
        if self.failing.contains(location) {
            return Err(FetchError::Transport(TransportError::Http {
                url: location.to_string(),
                status: 500,
            }));
        }
        Ok(TARBALL_BYTES.len() as u64)
    }
}
