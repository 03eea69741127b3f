//! Artifact reference validation.
//!
//! A location is a packaged-artifact reference when it ends with the registry
//! tarball suffix. The check is an exact end-of-string match: query strings,
//! signature suffixes (`.tgz.asc`) and other archive formats are rejected.

/// Suffix every published package tarball carries.
pub const ARTIFACT_SUFFIX: &str = ".tgz";

/// Returns true if `location` looks like a packaged-artifact reference.
///
/// Used identically for the location declared in the manifest and the one
/// reported by the registry.
///
/// # Examples
///
/// - `"https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz"` → `true`
/// - `"https://registry.npmjs.org/left-pad/-/left-pad-1.3.0.tgz.asc"` → `false`
pub fn is_valid_artifact_reference(location: &str) -> bool {
    location.ends_with(ARTIFACT_SUFFIX)
}
