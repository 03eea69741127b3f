//! Registry boundary: metadata lookups and artifact downloads.
//!
//! The pipeline depends only on the [`MetadataClient`] and [`ArtifactFetcher`]
//! traits; [`RegistryClient`] is the curl-backed implementation used by the CLI.

mod client;
mod error;
mod metadata;

use async_trait::async_trait;
use std::fmt;

pub use client::RegistryClient;
pub use error::{FetchError, TransportError};
pub use metadata::tarball_location;

/// Public npm registry; declared locations under it are rewritten onto an override registry.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Asks a registry where it currently publishes a package version.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn lookup(&self, name: &str, version: &str) -> Result<String, TransportError>;
}

/// Downloads an artifact and discards it, returning the number of bytes received.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, location: &str, integrity: Option<&str>) -> Result<u64, FetchError>;
}

/// Basic-auth credentials for a private registry.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn registry_base(registry: &str) -> &str {
    registry.trim_end_matches('/')
}

/// URL of the package document for `name`. Scoped names keep their `@` and
/// encode the separator (`@scope%2fname`), as registries expect.
pub fn package_document_url(registry: &str, name: &str) -> Result<String, TransportError> {
    let url = format!("{}/{}", registry_base(registry), name.replace('/', "%2f"));
    url::Url::parse(&url).map_err(|source| TransportError::InvalidUrl {
        url: url.clone(),
        source,
    })?;
    Ok(url)
}

/// Point a declared location at `registry` when it was recorded against the
/// public registry. Locations on other hosts are left untouched.
pub fn rewrite_location(location: &str, registry: &str) -> String {
    let base = registry_base(registry);
    if base == DEFAULT_REGISTRY {
        return location.to_string();
    }
    match location.strip_prefix(DEFAULT_REGISTRY) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("{}{}", base, rest),
        _ => location.to_string(),
    }
}

/// True if `url` lives under `registry`, i.e. credentials for the registry may be sent to it.
pub fn is_under_registry(url: &str, registry: &str) -> bool {
    let base = registry_base(registry);
    match url.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
