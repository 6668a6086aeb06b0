//! Error types for constants generation

use std::path::PathBuf;

use thiserror::Error;

use crate::templates::TemplateKind;

/// Result type for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors that can occur during constants generation
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Template file could not be read
    #[error("Failed to read {kind} template {path}: {source}")]
    TemplateUnreadable {
        /// Which of the three templates failed
        kind: TemplateKind,
        /// Resolved template path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Output directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        /// File that could not be written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// `transform_each` was called before a transform callback was set
    #[error("Transform callback not set before transform_each")]
    TransformNotSet,

    /// No adapter is registered for the logic ID
    #[error("No data-source adapter registered for logic ID '{0}'")]
    UnknownLogicId(String),

    /// Adapter source file could not be read
    #[error("Failed to read data source {path}: {source}")]
    SourceUnreadable {
        /// Source file path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Adapter source data could not be interpreted
    #[error("Invalid data source {path}: {message}")]
    SourceParse {
        /// Source file path
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// File watcher error
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Worker task failed to complete
    #[error("Generation worker failed: {0}")]
    Worker(String),
}

impl GenerationError {
    /// Create a source parse error
    pub fn source_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        GenerationError::SourceParse {
            path: path.into(),
            message: message.into(),
        }
    }
}
