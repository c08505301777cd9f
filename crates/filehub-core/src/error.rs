//! Error types for the filehub catalog.
//!
//! Catalog corruption is never surfaced here: `RegistryStore::load` recovers
//! locally by substituting an empty registry. Everything else that can fail
//! maps onto one variant of [`FileHubError`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the filehub core.
#[derive(Debug, Error)]
pub enum FileHubError {
    // Catalog lookups
    #[error("No file with id={id} in the catalog")]
    NotFound { id: String },

    #[error("Access to id={id} is not permitted")]
    PermissionDenied { id: String },

    // File system errors
    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Locking
    #[error("Lock error: {message}")]
    Lock { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for filehub operations.
pub type Result<T> = std::result::Result<T, FileHubError>;

impl From<std::io::Error> for FileHubError {
    fn from(err: std::io::Error) -> Self {
        FileHubError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for FileHubError {
    fn from(err: serde_json::Error) -> Self {
        FileHubError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl FileHubError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FileHubError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        FileHubError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the message is meant to be shown to an end user as-is.
    ///
    /// Storage and lock failures are internal; callers should log them and
    /// report a generic failure instead.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            FileHubError::NotFound { .. }
                | FileHubError::PermissionDenied { .. }
                | FileHubError::FileNotFound(_)
                | FileHubError::Validation { .. }
        )
    }

    /// Stable process exit status for command-line front ends.
    pub fn exit_code(&self) -> i32 {
        match self {
            FileHubError::NotFound { .. } | FileHubError::FileNotFound(_) => 2,
            FileHubError::PermissionDenied { .. } => 3,
            FileHubError::Validation { .. } => 4,
            FileHubError::Io { .. } | FileHubError::Json { .. } => 5,
            FileHubError::Lock { .. } => 6,
            FileHubError::Other(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FileHubError::NotFound {
            id: "logo".into(),
        };
        assert_eq!(err.to_string(), "No file with id=logo in the catalog");

        let err = FileHubError::validation("send_as", "unsupported value 'video'");
        assert_eq!(
            err.to_string(),
            "Validation error for send_as: unsupported value 'video'"
        );
    }

    #[test]
    fn test_user_facing_errors() {
        assert!(FileHubError::PermissionDenied { id: "a".into() }.is_user_facing());
        assert!(!FileHubError::Other("boom".into()).is_user_facing());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(!FileHubError::io_with_path(io, "/tmp/registry.json").is_user_facing());
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            FileHubError::NotFound { id: "a".into() }.exit_code(),
            FileHubError::PermissionDenied { id: "a".into() }.exit_code(),
            FileHubError::validation("f", "m").exit_code(),
            FileHubError::Lock { message: "m".into() }.exit_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
