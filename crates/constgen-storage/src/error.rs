//! Storage error types for constgen

use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// File read/write failed
    #[error("IO error on {path} ({operation}): {source}")]
    IoError {
        path: PathBuf,
        operation: IoOperation,
        source: std::io::Error,
    },

    /// Settings parsing failed
    #[error("Failed to parse {path} as {format}: {message}")]
    ParseError {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Invalid settings value
    #[error("Invalid settings value for {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Environment variable error
    #[error("Environment variable error for {var_name}: {message}")]
    EnvVarError { var_name: String, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// IO operation type for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    Read,
    Write,
}

impl std::fmt::Display for IoOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoOperation::Read => write!(f, "read"),
            IoOperation::Write => write!(f, "write"),
        }
    }
}

impl StorageError {
    /// Create an IO error
    pub fn io_error(path: PathBuf, operation: IoOperation, source: std::io::Error) -> Self {
        StorageError::IoError {
            path,
            operation,
            source,
        }
    }

    /// Create a parse error
    pub fn parse_error(
        path: PathBuf,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StorageError::ParseError {
            path,
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an environment variable error
    pub fn env_var_error(var_name: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::EnvVarError {
            var_name: var_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_operation() {
        let err = StorageError::io_error(
            PathBuf::from("constgen.yaml"),
            IoOperation::Read,
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let message = err.to_string();
        assert!(message.contains("constgen.yaml"));
        assert!(message.contains("(read)"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = StorageError::validation_error("watch.tick_rate_secs", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid settings value for watch.tick_rate_secs: must be positive"
        );
    }
}
