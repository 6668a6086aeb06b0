//! Settings storage for constgen
//!
//! Defines the generator settings model and loads it from YAML, TOML or JSON
//! files with environment variable overrides.

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod types;

pub use env::EnvOverrides;
pub use error::{IoOperation, StorageError, StorageResult};
pub use loader::{ConfigLoader, LoadedSettings, DEFAULT_SETTINGS_FILE};
pub use settings::{GeneratorItem, ResolvedTemplatePaths, Settings, TemplatePaths, WatchSettings};
pub use types::ConfigFormat;
