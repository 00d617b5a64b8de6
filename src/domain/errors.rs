//! Domain error types
//!
//! This module defines the error hierarchy for Aegis. All errors are
//! domain-specific and don't expose third-party types. The split between
//! run-level, record-level retryable, and record-level fatal variants drives
//! the orchestrator's retry policy.

use thiserror::Error;

/// Main Aegis error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AegisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level errors from the DIMSE gateway
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Candidate enumeration failed; the whole run is abandoned
    #[error("Enumeration error: {0}")]
    Enumeration(String),

    /// A source row could not be synthesized into a clinical record.
    /// Fatal for that record only and never retried.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A transfer attempt failed in a way that is worth retrying
    #[error("Transient transfer error: {0}")]
    TransientTransfer(String),

    /// A transfer attempt was rejected outright; retrying cannot help
    #[error("Fatal transfer error: {0}")]
    FatalTransfer(String),

    /// The post-transfer check itself could not run. Reported separately
    /// from transfer outcomes so operators can tell "backup failed" apart
    /// from "backup succeeded but could not be checked".
    #[error("Verification error: {0}")]
    Verification(String),

    /// Run ledger read/write errors
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Transport-specific errors
///
/// Errors that occur when talking to the DIMSE gateway. These never expose
/// the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to reach the gateway at all
    #[error("Failed to connect to gateway: {0}")]
    ConnectionFailed(String),

    /// Gateway rejected our credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Gateway answered with something we could not parse
    #[error("Invalid response from gateway: {0}")]
    InvalidResponse(String),

    /// The named peer is not registered with the gateway
    #[error("Peer not known to gateway: {0}")]
    PeerUnknown(String),

    /// Gateway accepted the request but the DIMSE operation failed to start
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Server error (5xx)
    #[error("Gateway server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Gateway client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl AegisError {
    /// Whether a failed transfer attempt carrying this error may be retried.
    ///
    /// Transient transfer problems and infrastructure hiccups (connection
    /// drops, timeouts, gateway 5xx) are retryable; malformed records,
    /// outright rejections, and authentication failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AegisError::TransientTransfer(_) => true,
            AegisError::Transport(t) => t.is_retryable(),
            AegisError::Database(_) => true,
            _ => false,
        }
    }

    /// Whether this error is fatal for the record it occurred on,
    /// terminating its retry loop immediately.
    pub fn is_record_fatal(&self) -> bool {
        matches!(
            self,
            AegisError::MalformedRecord(_) | AegisError::FatalTransfer(_)
        )
    }
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionFailed(_)
                | TransportError::Timeout(_)
                | TransportError::ServerError { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AegisError {
    fn from(err: std::io::Error) -> Self {
        AegisError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AegisError {
    fn from(err: serde_json::Error) -> Self {
        AegisError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AegisError {
    fn from(err: toml::de::Error) -> Self {
        AegisError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aegis_error_display() {
        let err = AegisError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_transport_error_conversion() {
        let transport_err = TransportError::ConnectionFailed("Network error".to_string());
        let aegis_err: AegisError = transport_err.into();
        assert!(matches!(aegis_err, AegisError::Transport(_)));
    }

    #[test]
    fn test_malformed_record_is_fatal_not_retryable() {
        let err = AegisError::MalformedRecord("missing patient id".to_string());
        assert!(err.is_record_fatal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transient_transfer_is_retryable() {
        let err = AegisError::TransientTransfer("partial sub-operations".to_string());
        assert!(err.is_retryable());
        assert!(!err.is_record_fatal());
    }

    #[test]
    fn test_transport_retryability_split() {
        assert!(TransportError::Timeout("30s elapsed".to_string()).is_retryable());
        assert!(TransportError::ServerError {
            status: 502,
            message: "bad gateway".to_string()
        }
        .is_retryable());
        assert!(
            !TransportError::AuthenticationFailed("bad credentials".to_string()).is_retryable()
        );
        assert!(!TransportError::ClientError {
            status: 404,
            message: "no such peer".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let aegis_err: AegisError = io_err.into();
        assert!(matches!(aegis_err, AegisError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let aegis_err: AegisError = json_err.into();
        assert!(matches!(aegis_err, AegisError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let aegis_err: AegisError = toml_err.into();
        assert!(matches!(aegis_err, AegisError::Configuration(_)));
        assert!(aegis_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_aegis_error_implements_std_error() {
        let err = AegisError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_transport_error_implements_std_error() {
        let err = TransportError::ConnectionFailed("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
