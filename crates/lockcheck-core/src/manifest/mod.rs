//! Lock manifest: locate `package-lock.json` and flatten it into dependency records.
//!
//! Lockfile v1/v2 `dependencies` trees are flattened into install-path keys
//! (`parent/node_modules/child`); each record remembers the keys nested under it
//! so verification can discover them incrementally. Lockfile v3 `packages` maps
//! are already flat.

mod error;
mod parse;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use error::StructuralError;
use parse::{RawDependency, RawLockfile, RawPackage};

/// File name looked up in the project directory.
pub const MANIFEST_FILE_NAME: &str = "package-lock.json";

const NODE_MODULES: &str = "node_modules/";

/// One locked dependency. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Registry package name (differs from the install key for nested or aliased entries).
    pub package_name: String,
    pub declared_version: String,
    /// `resolved` field; empty when the manifest omits it.
    pub declared_location: String,
    /// Subresource-Integrity string (`sha512-…`), if recorded.
    pub integrity: Option<String>,
    /// Keys of dependencies declared beneath this one.
    pub nested: Vec<String>,
}

/// Parsed lock manifest, shared read-only by all workers.
#[derive(Debug, Clone, Default)]
pub struct ParsedManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub lockfile_version: Option<u32>,
    dependencies: BTreeMap<String, DependencyRecord>,
    roots: Vec<String>,
}

impl ParsedManifest {
    /// Parse manifest JSON. `path` is only used in error messages.
    pub fn from_json_str(data: &str, path: &Path) -> Result<Self, StructuralError> {
        let raw: RawLockfile =
            serde_json::from_str(data).map_err(|source| StructuralError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut dependencies = BTreeMap::new();
        let roots = match (raw.dependencies, raw.packages) {
            (Some(deps), _) => flatten_dependencies(None, deps, &mut dependencies),
            (None, Some(packages)) => flatten_packages(packages, &mut dependencies),
            (None, None) => {
                return Err(StructuralError::NoDependencies {
                    path: path.to_path_buf(),
                })
            }
        };

        Ok(Self {
            name: raw.name,
            version: raw.version,
            lockfile_version: raw.lockfile_version,
            dependencies,
            roots,
        })
    }

    pub fn get(&self, key: &str) -> Option<&DependencyRecord> {
        self.dependencies.get(key)
    }

    /// Every dependency key, nested ones included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Keys with no parent entry. Verifying these and following `nested`
    /// reaches every key exactly once.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Resolve `<project>/package-lock.json` and make sure it is a readable file.
pub fn locate_manifest(project_path: &Path) -> Result<PathBuf, StructuralError> {
    let path = project_path.join(MANIFEST_FILE_NAME);
    let meta = fs::metadata(&path).map_err(|source| classify_io(&path, source))?;
    if meta.is_dir() {
        return Err(StructuralError::Unreadable {
            source: io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
            path,
        });
    }
    fs::File::open(&path).map_err(|source| classify_io(&path, source))?;
    Ok(path)
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<ParsedManifest, StructuralError> {
    let data = fs::read_to_string(path).map_err(|source| classify_io(path, source))?;
    ParsedManifest::from_json_str(&data, path)
}

fn classify_io(path: &Path, source: io::Error) -> StructuralError {
    let path = path.to_path_buf();
    if source.kind() == io::ErrorKind::NotFound {
        StructuralError::NotFound { path, source }
    } else {
        StructuralError::Unreadable { path, source }
    }
}

/// Insert one level of a v1 tree; returns the keys inserted at this level.
fn flatten_dependencies(
    parent: Option<&str>,
    deps: BTreeMap<String, RawDependency>,
    out: &mut BTreeMap<String, DependencyRecord>,
) -> Vec<String> {
    let mut level = Vec::with_capacity(deps.len());
    for (name, dep) in deps {
        if dep.bundled {
            tracing::debug!(dependency = %name, "skipping bundled dependency");
            continue;
        }
        let key = match parent {
            Some(p) => format!("{p}/{NODE_MODULES}{name}"),
            None => name.clone(),
        };
        let nested = match dep.dependencies {
            Some(children) => flatten_dependencies(Some(&key), children, out),
            None => Vec::new(),
        };
        let version = dep.version.unwrap_or_default();
        let (package_name, declared_version) = match split_alias(&version) {
            Some((real, v)) => (real.to_string(), v.to_string()),
            None => (name, version),
        };
        out.insert(
            key.clone(),
            DependencyRecord {
                package_name,
                declared_version,
                declared_location: dep.resolved.unwrap_or_default(),
                integrity: dep.integrity,
                nested,
            },
        );
        level.push(key);
    }
    level
}

/// `npm:<name>@<version>` as written for aliased installs.
fn split_alias(version: &str) -> Option<(&str, &str)> {
    let spec = version.strip_prefix("npm:")?;
    match spec.rsplit_once('@') {
        Some((name, v)) if !name.is_empty() && !v.is_empty() => Some((name, v)),
        _ => None,
    }
}

fn flatten_packages(
    packages: BTreeMap<String, RawPackage>,
    out: &mut BTreeMap<String, DependencyRecord>,
) -> Vec<String> {
    let mut roots = Vec::with_capacity(packages.len());
    for (path, pkg) in packages {
        // "" is the project itself; paths without node_modules are workspace members.
        let key = match path.strip_prefix(NODE_MODULES) {
            Some(key) => key,
            None if path.contains(&format!("/{NODE_MODULES}")) => path.as_str(),
            None => continue,
        };
        if pkg.link || pkg.in_bundle {
            tracing::debug!(dependency = %key, "skipping linked or bundled package");
            continue;
        }
        let package_name = pkg.name.unwrap_or_else(|| {
            key.rsplit(NODE_MODULES)
                .next()
                .unwrap_or(key)
                .to_string()
        });
        out.insert(
            key.to_string(),
            DependencyRecord {
                package_name,
                declared_version: pkg.version.unwrap_or_default(),
                declared_location: pkg.resolved.unwrap_or_default(),
                integrity: pkg.integrity,
                nested: Vec::new(),
            },
        );
        roots.push(key.to_string());
    }
    roots
}
