//! curl-backed registry client.
//!
//! Each request runs a blocking curl transfer on tokio's blocking pool. Bodies
//! are kept in memory only long enough to parse metadata or check integrity.

use async_trait::async_trait;
use std::time::Duration;

use crate::integrity::{self, IntegrityCheck};
use crate::retry::{run_with_retry, RetryPolicy};

use super::error::{FetchError, TransportError};
use super::metadata::tarball_location;
use super::{
    is_under_registry, package_document_url, rewrite_location, ArtifactFetcher, Credentials,
    MetadataClient,
};

/// Abbreviated metadata is much smaller than the full document and carries `dist.tarball`.
const ACCEPT_ABBREVIATED: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8, */*";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(120);

/// Registry client used for both lookups and fetches.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    registry: String,
    credentials: Option<Credentials>,
    retry: RetryPolicy,
    verify_integrity: bool,
}

impl RegistryClient {
    pub fn new(registry: impl Into<String>) -> Result<Self, TransportError> {
        let registry = registry.into();
        url::Url::parse(&registry).map_err(|source| TransportError::InvalidUrl {
            url: registry.clone(),
            source,
        })?;
        Ok(Self {
            registry,
            credentials: None,
            retry: RetryPolicy::default(),
            verify_integrity: true,
        })
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_integrity_check(mut self, enabled: bool) -> Self {
        self.verify_integrity = enabled;
        self
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    async fn get(&self, url: String, accept: Option<&'static str>) -> Result<Vec<u8>, TransportError> {
        // Never hand registry credentials to another host.
        let credentials = self
            .credentials
            .clone()
            .filter(|_| is_under_registry(&url, &self.registry));
        tokio::task::spawn_blocking(move || http_get(&url, accept, credentials.as_ref()))
            .await
            .map_err(|e| TransportError::Join(e.to_string()))?
    }
}

fn http_get(
    url: &str,
    accept: Option<&str>,
    credentials: Option<&Credentials>,
) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(TRANSFER_TIMEOUT)?;
    easy.useragent(concat!("lockcheck/", env!("CARGO_PKG_VERSION")))?;
    if let Some(c) = credentials {
        easy.username(&c.user)?;
        easy.password(&c.password)?;
    }
    if let Some(accept) = accept {
        let mut list = curl::easy::List::new();
        list.append(&format!("Accept: {}", accept))?;
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        return Err(TransportError::Http {
            url: url.to_string(),
            status,
        });
    }
    Ok(body)
}

#[async_trait]
impl MetadataClient for RegistryClient {
    async fn lookup(&self, name: &str, version: &str) -> Result<String, TransportError> {
        let url = package_document_url(&self.registry, name)?;
        let body = run_with_retry(&self.retry, "metadata lookup", || {
            self.get(url.clone(), Some(ACCEPT_ABBREVIATED))
        })
        .await
        .map_err(|e| match e {
            TransportError::Http { status: 404, .. } => TransportError::NotPublished {
                name: name.to_string(),
                version: version.to_string(),
            },
            other => other,
        })?;
        tarball_location(&body, name, version)
    }
}

#[async_trait]
impl ArtifactFetcher for RegistryClient {
    async fn fetch(&self, location: &str, integrity: Option<&str>) -> Result<u64, FetchError> {
        let url = rewrite_location(location, &self.registry);
        let body = run_with_retry(&self.retry, "artifact fetch", || self.get(url.clone(), None)).await?;

        if let (true, Some(sri)) = (self.verify_integrity, integrity) {
            match integrity::verify(&body, sri)? {
                IntegrityCheck::Verified(algorithm) => {
                    tracing::debug!(url = %url, %algorithm, "integrity verified");
                }
                IntegrityCheck::Skipped => {
                    tracing::debug!(url = %url, "no supported integrity algorithm; skipped");
                }
            }
        }
        Ok(body.len() as u64)
    }
}
