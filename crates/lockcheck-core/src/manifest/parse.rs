//! Minimal package-lock.json structures (lockfile versions 1 through 3).

use serde::Deserialize;
use std::collections::BTreeMap;

/// Root of a package-lock.json document.
#[derive(Debug, Deserialize)]
pub struct RawLockfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "lockfileVersion")]
    pub lockfile_version: Option<u32>,
    /// v1/v2: name → entry, possibly nested.
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, RawDependency>>,
    /// v2/v3: install path → entry, flat.
    #[serde(default)]
    pub packages: Option<BTreeMap<String, RawPackage>>,
}

#[derive(Debug, Deserialize)]
pub struct RawDependency {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub resolved: Option<String>,
    #[serde(default)]
    pub integrity: Option<String>,
    #[serde(default)]
    pub bundled: bool,
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, RawDependency>>,
}

#[derive(Debug, Deserialize)]
pub struct RawPackage {
    /// Present for aliased installs, where the install path differs from the package.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub resolved: Option<String>,
    #[serde(default)]
    pub integrity: Option<String>,
    #[serde(default)]
    pub link: bool,
    #[serde(default, rename = "inBundle")]
    pub in_bundle: bool,
}
