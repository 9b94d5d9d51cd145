//! Error types for the Roster registry.
//!
//! Every store and registry operation returns [`RosterError`]. The four store
//! variants (`NotFound`, `CorruptRecord`, `StoreWrite`, `StoreRead`) are
//! surfaced to callers unchanged; nothing in the library retries them.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Roster library.
#[derive(Debug, Error)]
pub enum RosterError {
    // Record store errors
    #[error("Service not found: {name}")]
    NotFound { name: String },

    #[error("Corrupt record for {name}: {message}")]
    CorruptRecord {
        name: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Store write failed at {path:?}: {message}")]
    StoreWrite {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Store read failed at {path:?}: {message}")]
    StoreRead {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Roster operations.
pub type Result<T> = std::result::Result<T, RosterError>;

impl RosterError {
    /// Create a not-found error for a service name.
    pub fn not_found(name: impl Into<String>) -> Self {
        RosterError::NotFound { name: name.into() }
    }

    /// Create a write error with path context.
    pub fn write_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        RosterError::StoreWrite {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a read error with path context.
    pub fn read_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        RosterError::StoreRead {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether this error means the record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RosterError::NotFound { .. })
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32001: Service not found
    /// - -32002: Corrupt record
    /// - -32003: Store I/O failure
    /// - -32005: Validation error
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            RosterError::NotFound { .. } => -32001,
            RosterError::CorruptRecord { .. } => -32002,
            RosterError::StoreWrite { .. } | RosterError::StoreRead { .. } => -32003,
            RosterError::Validation { .. } => -32005,
            RosterError::MethodNotFound { .. } => -32601,
            RosterError::InvalidParams { .. } => -32602,
            _ => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RosterError::not_found("svc-a");
        assert_eq!(err.to_string(), "Service not found: svc-a");
    }

    #[test]
    fn test_rpc_error_codes() {
        assert_eq!(RosterError::not_found("svc-a").to_rpc_error_code(), -32001);
        assert_eq!(
            RosterError::CorruptRecord {
                name: "svc-a".into(),
                message: "bad json".into(),
                source: None,
            }
            .to_rpc_error_code(),
            -32002
        );
        assert_eq!(
            RosterError::write_with_path(
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                "/tmp/x.json"
            )
            .to_rpc_error_code(),
            -32003
        );
        assert_eq!(
            RosterError::MethodNotFound {
                method: "teleport".into()
            }
            .to_rpc_error_code(),
            -32601
        );
        assert_eq!(RosterError::Other("x".into()).to_rpc_error_code(), -32603);
    }

    #[test]
    fn test_is_not_found() {
        assert!(RosterError::not_found("svc-a").is_not_found());
        assert!(!RosterError::Other("boom".into()).is_not_found());
    }
}
