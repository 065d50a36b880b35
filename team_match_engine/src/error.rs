/// Team Match Engine: Error Taxonomy
///
/// One error type crosses every public boundary of the engine and runtime.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Size or identity constraint violated. Raised before any mutation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Member or archetype id could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),
    /// Rejected by an external collaborator's authorization check.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Recompute failed (collaborator error or timeout). Retry the same operation.
    #[error("transient compute failure: {0}")]
    TransientComputeFailure(String),
    /// The membership write behind `apply` failed.
    #[error("commit conflict: {0}")]
    CommitConflict(String),
}

impl EngineError {
    /// Whether repeating the same call may succeed without caller changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::TransientComputeFailure(_) | EngineError::CommitConflict(_)
        )
    }
}
