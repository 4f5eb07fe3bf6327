//! Error types for analytics fetching

use thiserror::Error;

/// Result type alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors that can occur while fetching one analytic
///
/// The `Display` form is what the dashboard shows in a metric's error card.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API returned error: {status}")]
    Status {
        /// HTTP status returned by the backend
        status: reqwest::StatusCode,
    },

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response did not contain the expected section
    #[error("Response is missing '{pointer}'")]
    MissingField {
        /// JSON pointer that did not resolve
        pointer: String,
    },

    /// Invalid client configuration
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Error raised by the core crate
    #[error(transparent)]
    Core(#[from] fmdash_core::Error),
}

impl AnalyticsError {
    /// Create a status error
    pub const fn status(status: reqwest::StatusCode) -> Self {
        Self::Status { status }
    }

    /// Create a missing field error
    pub fn missing_field(pointer: impl Into<String>) -> Self {
        Self::MissingField {
            pointer: pointer.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the failure happened before a response was received
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = AnalyticsError::status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "API returned error: 500 Internal Server Error");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_missing_field_display() {
        let err = AnalyticsError::missing_field("/amcs_statistics/amcs_stats");
        assert_eq!(
            err.to_string(),
            "Response is missing '/amcs_statistics/amcs_stats'"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err = AnalyticsError::from(fmdash_core::Error::storage("disk full"));
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_configuration_error() {
        let err = AnalyticsError::configuration("base URL is not absolute");
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
        assert!(err.to_string().contains("base URL"));
    }
}
