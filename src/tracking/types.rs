//! Common tracking types

use crate::platform::ProviderError;
use thiserror::Error;

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Tracker error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// The user declined location authorization
    #[error("location permission denied")]
    PermissionDenied,
    /// The location service is off and could not be enabled
    #[error("location service disabled")]
    ServiceDisabled,
    /// A one-shot fetch failed
    #[error("location unavailable: {reason}")]
    LocationUnavailable { reason: String },
    /// A one-shot fetch did not complete in time
    #[error("no location fix after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// The tracker was disposed
    #[error("tracker disposed")]
    Disposed,
}

impl From<ProviderError> for TrackerError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::PermissionDenied => TrackerError::PermissionDenied,
            ProviderError::ServiceDisabled => TrackerError::ServiceDisabled,
            other => TrackerError::LocationUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Lifecycle of a tracker's upstream watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No watch; `start` may be called
    Idle,
    /// A watch is active
    Tracking,
    /// Disposed; no further use
    Disposed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_mapping() {
        assert_eq!(
            TrackerError::from(ProviderError::PermissionDenied),
            TrackerError::PermissionDenied
        );
        assert_eq!(
            TrackerError::from(ProviderError::ServiceDisabled),
            TrackerError::ServiceDisabled
        );
        assert!(matches!(
            TrackerError::from(ProviderError::unavailable("no signal")),
            TrackerError::LocationUnavailable { reason } if reason.contains("no signal")
        ));
    }
}
