//! Runner error types.

use thiserror::Error;

use crate::VisitError;

/// Errors that abort a highlighting pass.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The pass was cancelled.
    #[error("Highlighting cancelled")]
    Cancelled,

    /// The host environment is being torn down.
    #[error("Host disposed: {0}")]
    Disposed(String),

    /// A visitor needed indices that are not available.
    #[error("Indices are not ready")]
    IndexNotReady,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A visitor failure escaped local recovery.
    #[error("Visitor error: {0}")]
    Visitor(String),
}

impl RunnerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true when the pass ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<VisitError> for RunnerError {
    fn from(error: VisitError) -> Self {
        match error {
            VisitError::Cancelled => Self::Cancelled,
            VisitError::Disposed(message) => Self::Disposed(message),
            VisitError::IndexNotReady => Self::IndexNotReady,
            VisitError::Failed(message) => Self::Visitor(message),
        }
    }
}
