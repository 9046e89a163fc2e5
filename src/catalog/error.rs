//! Marker catalog error types

use thiserror::Error;

/// Errors raised while loading markers or resolving their icons
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Marker configuration missing or malformed
    #[error("failed to load {origin}: {message}")]
    ConfigLoad { origin: String, message: String },
    /// An icon reference could not be decoded
    #[error("failed to resolve icon '{reference}': {reason}")]
    IconResolution { reference: String, reason: String },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn config_load(origin: impl Into<String>, message: impl ToString) -> Self {
        CatalogError::ConfigLoad {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}
