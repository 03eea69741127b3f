//! Errors that abort the pipeline.

use thiserror::Error;

use crate::manifest::StructuralError;

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Fail-fast stopped a pooled stage.
    #[error("stopped after {failed} failure(s); {not_started} dependencies were not attempted")]
    Aborted { failed: usize, not_started: usize },

    /// Strict mode treats any verification failure as fatal.
    #[error("{failed} dependencies failed verification")]
    StrictVerification { failed: usize },
}
