//! Error types for the diagnosis pipeline.

use thiserror::Error;

use crate::llm::ProviderError;

/// Diagnosis pipeline error type.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// Missing or empty input.
    #[error("validation error: {0}")]
    Validation(String),
    /// The provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl DiagnosisError {
    /// Whether the caller, not the provider, is at fault.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience result alias for diagnosis operations.
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;
