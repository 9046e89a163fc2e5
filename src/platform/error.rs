//! Platform location service error types

use thiserror::Error;

/// Rejections surfaced by a platform location service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The user declined location authorization
    #[error("location permission denied")]
    PermissionDenied,
    /// The location service is switched off
    #[error("location service disabled")]
    ServiceDisabled,
    /// The service could not produce a fix
    #[error("location unavailable: {reason}")]
    Unavailable { reason: String },
    /// A watch handle that the service does not know about
    #[error("unknown watch handle {handle}")]
    InvalidHandle { handle: u32 },
    /// Rejected tracking parameters
    #[error("invalid tracking parameter {parameter} = {value}")]
    InvalidConfiguration { parameter: String, value: String },
}

/// Result type for platform operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether a continuous watch can keep running after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unavailable { .. })
    }
}
