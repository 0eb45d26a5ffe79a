//! Error types for order tracking operations.

use auth_refresh_client::AuthError;
use thiserror::Error;

/// Error type for tracking fetches and side actions.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Failure on the authenticated request path (transport, no session).
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// The backend answered a side action with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// The HTTP status code returned by the backend.
        status: u16,
        /// The response body, typically containing error details.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tip amount rejected before any network call: must be a positive
    /// integer no greater than the configured cap.
    #[error("invalid tip amount: {0}")]
    InvalidTip(u32),

    /// Rating rejected before any network call: must be one of 1..=5.
    #[error("invalid partner rating: {0}")]
    InvalidRating(u8),
}

/// Convenience Result type alias for tracking operations.
pub type TrackingResult<T> = Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = TrackingError::Api {
            status: 422,
            message: "tip already added".to_string(),
        };
        assert_eq!(format!("{}", err), "API error: 422 - tip already added");
    }

    #[test]
    fn validation_error_display() {
        assert_eq!(
            format!("{}", TrackingError::InvalidTip(9000)),
            "invalid tip amount: 9000"
        );
        assert_eq!(
            format!("{}", TrackingError::InvalidRating(7)),
            "invalid partner rating: 7"
        );
    }

    #[test]
    fn auth_error_converts() {
        let err: TrackingError = AuthError::NotInitialized.into();
        assert!(format!("{}", err).contains("no session attached"));
    }
}
