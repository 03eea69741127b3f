//! Subresource-Integrity (SRI) checks for fetched artifacts.
//!
//! Lockfiles record `integrity` as one or more space-separated
//! `<algorithm>-<base64 digest>` tokens. We verify against the strongest
//! algorithm we support; entries that only carry unsupported algorithms
//! (e.g. legacy `sha1-…`) are reported as skipped rather than failed.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms accepted in SRI strings, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Algorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "sha256" => Some(Algorithm::Sha256),
            "sha384" => Some(Algorithm::Sha384),
            "sha512" => Some(Algorithm::Sha512),
            _ => None,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha256 => Sha256::digest(data).to_vec(),
            Algorithm::Sha384 => Sha384::digest(data).to_vec(),
            Algorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_prefix(&s.to_ascii_lowercase())
            .ok_or_else(|| IntegrityError::Malformed(format!("unsupported algorithm {:?}", s)))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("malformed integrity string {0:?}")]
    Malformed(String),

    #[error("{algorithm} digest mismatch: expected {expected}, got {actual}")]
    Mismatch {
        algorithm: Algorithm,
        expected: String,
        actual: String,
    },
}

/// Outcome of a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityCheck {
    Verified(Algorithm),
    /// No supported algorithm in the SRI string.
    Skipped,
}

/// The strongest supported `(algorithm, digest)` pair in an SRI string.
fn strongest(sri: &str) -> Result<Option<(Algorithm, Vec<u8>)>, IntegrityError> {
    let mut best: Option<(Algorithm, Vec<u8>)> = None;
    for token in sri.split_whitespace() {
        let Some((prefix, encoded)) = token.split_once('-') else {
            return Err(IntegrityError::Malformed(sri.to_string()));
        };
        let Some(algorithm) = Algorithm::from_prefix(prefix) else {
            continue;
        };
        // SRI allows `?opts` after the digest.
        let encoded = encoded.split('?').next().unwrap_or(encoded);
        let digest = STANDARD
            .decode(encoded)
            .map_err(|_| IntegrityError::Malformed(sri.to_string()))?;
        if best.as_ref().map_or(true, |(a, _)| algorithm > *a) {
            best = Some((algorithm, digest));
        }
    }
    Ok(best)
}

/// Check `data` against the SRI string `sri`.
pub fn verify(data: &[u8], sri: &str) -> Result<IntegrityCheck, IntegrityError> {
    let Some((algorithm, expected)) = strongest(sri)? else {
        return Ok(IntegrityCheck::Skipped);
    };
    let actual = algorithm.digest(data);
    if actual != expected {
        return Err(IntegrityError::Mismatch {
            algorithm,
            expected: STANDARD.encode(&expected),
            actual: STANDARD.encode(&actual),
        });
    }
    Ok(IntegrityCheck::Verified(algorithm))
}

/// SRI string for in-memory data.
pub fn sri_for_bytes(data: &[u8], algorithm: Algorithm) -> String {
    format!("{}-{}", algorithm, STANDARD.encode(algorithm.digest(data)))
}

fn digest_file<D: Digest>(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = D::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Compute the SRI string of a file, reading in chunks to keep memory bounded.
pub fn sri_for_path(path: &Path, algorithm: Algorithm) -> Result<String> {
    let digest = match algorithm {
        Algorithm::Sha256 => digest_file::<Sha256>(path)?,
        Algorithm::Sha384 => digest_file::<Sha384>(path)?,
        Algorithm::Sha512 => digest_file::<Sha512>(path)?,
    };
    Ok(format!("{}-{}", algorithm, STANDARD.encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EMPTY_SHA512: &str =
        "sha512-z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXcg/SpIdNs6c5H0NE8XYXysP+DGNKHfuwvY7kxvUdBeoGlODJ6+SfaPg==";

    #[test]
    fn verify_empty_sha512() {
        assert_eq!(
            verify(b"", EMPTY_SHA512),
            Ok(IntegrityCheck::Verified(Algorithm::Sha512))
        );
    }

    #[test]
    fn verify_mismatch() {
        let err = verify(b"not empty", EMPTY_SHA512).unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::Mismatch {
                algorithm: Algorithm::Sha512,
                ..
            }
        ));
    }

    #[test]
    fn sha1_only_is_skipped() {
        assert_eq!(
            verify(b"", "sha1-2jmj7l5rSw0yVb/vlWAYkK/YBwk="),
            Ok(IntegrityCheck::Skipped)
        );
    }

    #[test]
    fn strongest_algorithm_wins() {
        // Wrong sha256, correct sha512: the sha512 entry decides.
        let sri = format!(
            "sha256-WJG1tSLV3whtD/CxEPvZ0hu0/HFjrzTQgoai6Eb2vgM= {}",
            EMPTY_SHA512
        );
        assert_eq!(
            verify(b"", &sri),
            Ok(IntegrityCheck::Verified(Algorithm::Sha512))
        );
    }

    #[test]
    fn malformed_tokens() {
        assert!(matches!(
            verify(b"", "sha512"),
            Err(IntegrityError::Malformed(_))
        ));
        assert!(matches!(
            verify(b"", "sha512-***"),
            Err(IntegrityError::Malformed(_))
        ));
    }

    #[test]
    fn algorithm_names() {
        assert_eq!("SHA384".parse::<Algorithm>(), Ok(Algorithm::Sha384));
        assert!("sha1".parse::<Algorithm>().is_err());
    }

    #[test]
    fn sri_for_bytes_known_content() {
        assert_eq!(
            sri_for_bytes(b"hello\n", Algorithm::Sha256),
            "sha256-WJG1tSLV3whtD/CxEPvZ0hu0/HFjrzTQgoai6Eb2vgM="
        );
    }

    #[test]
    fn sri_for_path_matches_bytes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(
            sri_for_path(f.path(), Algorithm::Sha384).unwrap(),
            "sha384-HQ8oTv4+3qS5yjvVFPoTSxfq42HMx6Hu/v+AG5vWYE4B8h9r8knvAwWZ8MIY8rqM"
        );
        assert_eq!(
            sri_for_path(f.path(), Algorithm::Sha512).unwrap(),
            sri_for_bytes(b"hello\n", Algorithm::Sha512)
        );
    }
}
