//! Run-scoped state shared by the stages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::manifest::{ParsedManifest, StructuralError};

/// Owned by the orchestrator and passed `&mut` into each stage.
///
/// `manifest_path` is populated by the locate stage, `manifest` by the parse
/// stage. Stages read them through the accessors, which fail with a
/// structural error when an earlier stage did not run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub project_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub manifest: Option<Arc<ParsedManifest>>,
}

impl RunContext {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            manifest_path: None,
            manifest: None,
        }
    }

    pub fn manifest_path(&self) -> Result<&Path, StructuralError> {
        self.manifest_path
            .as_deref()
            .ok_or(StructuralError::MissingContext("manifest path"))
    }

    pub fn manifest(&self) -> Result<Arc<ParsedManifest>, StructuralError> {
        self.manifest
            .clone()
            .ok_or(StructuralError::MissingContext("parsed manifest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpopulated_fields_are_structural_errors() {
        let ctx = RunContext::new("/tmp/project");
        assert!(matches!(
            ctx.manifest_path(),
            Err(StructuralError::MissingContext("manifest path"))
        ));
        assert!(matches!(
            ctx.manifest(),
            Err(StructuralError::MissingContext("parsed manifest"))
        ));
    }
}
