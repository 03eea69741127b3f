//! Integrity command: print the SRI string of a file.

use anyhow::Result;
use lockcheck_core::integrity::{self, Algorithm};
use std::path::Path;

/// Compute and print the SRI string of the given file.
pub fn run_integrity(path: &Path, algorithm: Algorithm) -> Result<()> {
    let sri = integrity::sri_for_path(path, algorithm)?;
    println!("{}  {}", sri, path.display());
    Ok(())
}
