//! Settings file loader supporting multiple formats
//!
//! Loads settings files in YAML, TOML, and JSON formats.
//! The format is detected from the file extension.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::EnvOverrides;
use crate::error::{IoOperation, StorageError, StorageResult};
use crate::settings::Settings;
use crate::types::ConfigFormat;

/// Default settings file name looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "constgen.yaml";

/// Settings loaded from disk together with the directory they came from
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// Directory containing the settings file; relative identifiers resolve against it
    pub base_dir: PathBuf,
    pub path: PathBuf,
}

impl LoadedSettings {
    /// Data root, relative roots resolved against the settings directory
    pub fn data_root(&self) -> PathBuf {
        if self.settings.data_root.is_absolute() {
            self.settings.data_root.clone()
        } else {
            self.base_dir.join(&self.settings.data_root)
        }
    }

    /// Watched path, relative paths resolved against the data root
    pub fn watch_path(&self) -> Option<PathBuf> {
        self.settings.watch.path.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.data_root().join(path)
            }
        })
    }
}

/// Settings loader for multiple formats
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a file
    ///
    /// Automatically detects format based on file extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StorageResult<Settings> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StorageError::io_error(path.to_path_buf(), IoOperation::Read, e))?;

        let format = Self::detect_format(path)?;
        Self::load_from_string(&content, format, path)
    }

    /// Load, apply environment overrides, and validate
    pub fn load<P: AsRef<Path>>(path: P) -> StorageResult<LoadedSettings> {
        let path = path.as_ref();
        let mut settings = Self::load_from_file(path)?;
        EnvOverrides::apply(&mut settings)?;
        settings.validate()?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!(
            path = %path.display(),
            generators = settings.generators.len(),
            "Loaded settings"
        );

        Ok(LoadedSettings {
            settings,
            base_dir,
            path: path.to_path_buf(),
        })
    }

    /// Load settings from a string with specified format
    pub fn load_from_string<P: AsRef<Path>>(
        content: &str,
        format: ConfigFormat,
        path: P,
    ) -> StorageResult<Settings> {
        let path = path.as_ref();
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| StorageError::parse_error(path.to_path_buf(), "YAML", e.to_string())),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| StorageError::parse_error(path.to_path_buf(), "TOML", e.to_string())),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| StorageError::parse_error(path.to_path_buf(), "JSON", e.to_string())),
        }
    }

    /// Serialize settings to string in specified format
    pub fn serialize(settings: &Settings, format: ConfigFormat) -> StorageResult<String> {
        match format {
            ConfigFormat::Yaml => serde_yaml::to_string(settings).map_err(|e| {
                StorageError::Internal(format!("Failed to serialize to YAML: {}", e))
            }),
            ConfigFormat::Toml => toml::to_string_pretty(settings).map_err(|e| {
                StorageError::Internal(format!("Failed to serialize to TOML: {}", e))
            }),
            ConfigFormat::Json => serde_json::to_string_pretty(settings).map_err(|e| {
                StorageError::Internal(format!("Failed to serialize to JSON: {}", e))
            }),
        }
    }

    /// Save settings to a file, format taken from the extension
    pub fn save_to_file<P: AsRef<Path>>(settings: &Settings, path: P) -> StorageResult<()> {
        let path = path.as_ref();
        let format = Self::detect_format(path)?;
        let content = Self::serialize(settings, format)?;
        std::fs::write(path, content)
            .map_err(|e| StorageError::io_error(path.to_path_buf(), IoOperation::Write, e))
    }

    fn detect_format(path: &Path) -> StorageResult<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                StorageError::parse_error(path.to_path_buf(), "unknown", "File has no extension")
            })?;

        ConfigFormat::from_extension(extension).ok_or_else(|| {
            StorageError::parse_error(
                path.to_path_buf(),
                "unknown",
                format!("Unsupported file format: {}", extension),
            )
        })
    }
}
