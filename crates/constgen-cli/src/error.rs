use constgen_generation::GenerationError;
use constgen_storage::StorageError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{failed} of {total} generator items failed")]
    RunFailed { failed: usize, total: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'constgen --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => {
                format!("File operation failed: {}", e)
            }
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nRun 'constgen init' to create a settings file.",
                    msg
                )
            }
            CliError::Storage(StorageError::IoError { path, .. }) => {
                format!(
                    "Could not read settings file {}\n\nRun 'constgen init' to create one, or pass --config.",
                    path.display()
                )
            }
            CliError::Storage(e) => {
                format!(
                    "Settings error: {}\n\nRun 'constgen inspect' to check your settings.",
                    e
                )
            }
            CliError::Generation(e) => {
                format!("Generation failed: {}", e)
            }
            CliError::RunFailed { failed, total } => {
                format!(
                    "{} of {} generator items failed.\n\nRun with --verbose for details.",
                    failed, total
                )
            }
            CliError::Internal(msg) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use constgen_storage::IoOperation;

    use super::*;

    #[test]
    fn test_missing_settings_suggests_init() {
        let error = CliError::from(StorageError::io_error(
            PathBuf::from("constgen.yaml"),
            IoOperation::Read,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        ));
        let msg = error.user_message();
        assert!(msg.contains("constgen.yaml"));
        assert!(msg.contains("constgen init"));
    }

    #[test]
    fn test_generation_error_conversion() {
        let error = CliError::from(GenerationError::UnknownLogicId("nope".to_string()));
        assert!(matches!(error, CliError::Generation(_)));
        assert!(error.user_message().contains("nope"));
    }

    #[test]
    fn test_run_failed_message() {
        let error = CliError::RunFailed { failed: 1, total: 3 };
        assert!(error.user_message().contains("1 of 3"));
        assert!(error.technical_details().contains("RunFailed"));
    }
}
