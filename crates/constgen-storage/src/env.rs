//! Environment variable override support
//!
//! Variables with the CONSTGEN_ prefix override settings loaded from disk.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::settings::Settings;

/// Overrides `data_root`
pub const DATA_ROOT_VAR: &str = "CONSTGEN_DATA_ROOT";
/// Overrides `watch.path`
pub const WATCH_PATH_VAR: &str = "CONSTGEN_WATCH_PATH";
/// Overrides `watch.tick_rate_secs`
pub const TICK_RATE_VAR: &str = "CONSTGEN_TICK_RATE";

/// Environment variable overrides
pub struct EnvOverrides;

impl EnvOverrides {
    /// Collect the CONSTGEN_ variables of the current process
    pub fn parse() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("CONSTGEN_"))
            .collect()
    }

    /// Apply the current process environment to the settings
    pub fn apply(settings: &mut Settings) -> StorageResult<()> {
        Self::apply_overrides(settings, &Self::parse())
    }

    /// Apply specific overrides to settings
    ///
    /// Unknown CONSTGEN_ variables are ignored.
    pub fn apply_overrides(
        settings: &mut Settings,
        overrides: &HashMap<String, String>,
    ) -> StorageResult<()> {
        if let Some(root) = overrides.get(DATA_ROOT_VAR) {
            debug!(var = DATA_ROOT_VAR, value = %root, "Applying override");
            settings.data_root = PathBuf::from(root);
        }

        if let Some(path) = overrides.get(WATCH_PATH_VAR) {
            debug!(var = WATCH_PATH_VAR, value = %path, "Applying override");
            settings.watch.path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }

        if let Some(rate) = overrides.get(TICK_RATE_VAR) {
            let parsed = rate.parse::<f64>().map_err(|e| {
                StorageError::env_var_error(TICK_RATE_VAR, format!("'{}': {}", rate, e))
            })?;
            settings.watch.tick_rate_secs = parsed;
        }

        Ok(())
    }
}
