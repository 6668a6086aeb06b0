//! Output writer for generated constants files
//!
//! Writes the files of one generator item. Parent directories are created
//! immediately before each write; dry-run mode reports what would be
//! written without touching the file system.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{GenerationError, GenerationResult};
use crate::templates::TemplateKind;

/// Configuration for output writing
#[derive(Debug, Clone, Default)]
pub struct OutputWriterConfig {
    /// Compute and report files without writing them
    pub dry_run: bool,
}

/// A fully assembled output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Template the file was produced from
    pub kind: TemplateKind,
    /// Destination path
    pub path: PathBuf,
    /// Final file content
    pub content: String,
}

/// Result of writing a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWriteResult {
    pub kind: TemplateKind,
    pub path: PathBuf,
    /// Whether the file was actually written
    pub written: bool,
    /// Size of the content in bytes
    pub bytes: usize,
}

/// Writes generated files to disk
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    config: OutputWriterConfig,
}

impl OutputWriter {
    /// Create a writer that writes files
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputWriterConfig) -> Self {
        Self { config }
    }

    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Write files in order, stopping at the first failure
    pub fn write_all(&self, files: &[GeneratedFile]) -> GenerationResult<Vec<FileWriteResult>> {
        files.iter().map(|file| self.write(file)).collect()
    }

    /// Write one file, creating its parent directory first
    pub fn write(&self, file: &GeneratedFile) -> GenerationResult<FileWriteResult> {
        if self.config.dry_run {
            debug!(path = %file.path.display(), bytes = file.content.len(), "Dry run, not writing");
            return Ok(FileWriteResult {
                kind: file.kind,
                path: file.path.clone(),
                written: false,
                bytes: file.content.len(),
            });
        }

        if let Some(parent) = file.path.parent() {
            ensure_directory(parent)?;
        }

        fs::write(&file.path, &file.content).map_err(|source| GenerationError::WriteFailed {
            path: file.path.clone(),
            source,
        })?;

        info!(kind = %file.kind, path = %file.path.display(), "Wrote generated file");
        Ok(FileWriteResult {
            kind: file.kind,
            path: file.path.clone(),
            written: true,
            bytes: file.content.len(),
        })
    }
}

fn ensure_directory(path: &Path) -> GenerationResult<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| GenerationError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source,
    })
}
