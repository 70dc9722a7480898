//! Error types for mxstate
//!
//! The state store itself never fails: unknown keys come back as `None` and
//! malformed membership content resolves to a default. These errors cover the
//! layers around it (room routing, decoding, configuration).

use thiserror::Error;

/// mxstate error types
#[derive(Debug, Error)]
pub enum MxStateError {
    /// The event cannot be routed or stored
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A configured limit was reached
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Result type for mxstate operations
pub type Result<T> = std::result::Result<T, MxStateError>;

impl From<serde_json::Error> for MxStateError {
    fn from(err: serde_json::Error) -> Self {
        MxStateError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_error_display() {
        let err = MxStateError::InvalidEvent("test".to_string());
        assert_eq!(err.to_string(), "Invalid event: test");

        let err = MxStateError::Serialization("test".to_string());
        assert_eq!(err.to_string(), "Serialization error: test");

        let err = MxStateError::InvalidConfig("test".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: test");

        let err = MxStateError::NotFound("test".to_string());
        assert_eq!(err.to_string(), "Resource not found: test");

        let err = MxStateError::LimitExceeded("test".to_string());
        assert_eq!(err.to_string(), "Limit exceeded: test");
    }

    #[test]
    fn test_error_conversion_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MxStateError = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }
}
