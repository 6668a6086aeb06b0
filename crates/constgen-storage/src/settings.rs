//! Generator settings
//!
//! The settings describe which templates to use, where generated files go,
//! which external file to watch, and the list of generator items driven
//! through the pipeline on every run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Top-level generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory all output paths and source paths are relative to
    pub data_root: PathBuf,
    /// File extension for generated files (without the dot)
    pub output_extension: String,
    /// Template identifiers
    pub templates: TemplatePaths,
    /// Change-watch configuration
    pub watch: WatchSettings,
    /// Generator items, processed in this order
    pub generators: Vec<GeneratorItem>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            output_extension: "cs".to_string(),
            templates: TemplatePaths::default(),
            watch: WatchSettings::default(),
            generators: Vec::new(),
        }
    }
}

impl Settings {
    /// Validate settings values that serde cannot check on its own
    pub fn validate(&self) -> StorageResult<()> {
        for (field, value) in [
            ("templates.runtime", &self.templates.runtime),
            ("templates.list", &self.templates.list),
            ("templates.lookup", &self.templates.lookup),
        ] {
            if value.trim().is_empty() {
                return Err(StorageError::validation_error(
                    field,
                    "template identifier must not be empty",
                ));
            }
        }

        if !(self.watch.tick_rate_secs > 0.0) {
            return Err(StorageError::validation_error(
                "watch.tick_rate_secs",
                format!("must be positive, got {}", self.watch.tick_rate_secs),
            ));
        }

        if self.output_extension.trim().is_empty() {
            return Err(StorageError::validation_error(
                "output_extension",
                "must not be empty",
            ));
        }

        for (index, item) in self.generators.iter().enumerate() {
            if item.logic_id.trim().is_empty() {
                return Err(StorageError::validation_error(
                    format!("generators[{}].logic_id", index),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Items that take part in a run: active, and included by the filter if one is given
    pub fn selected_items<'a>(
        &'a self,
        filter: Option<&'a [String]>,
    ) -> impl Iterator<Item = &'a GeneratorItem> + 'a {
        self.generators
            .iter()
            .filter(move |item| item.is_selected(filter))
    }
}

/// Identifiers of the three templates driven by every generator item
///
/// Identifiers are file paths. Relative identifiers are resolved against
/// the directory holding the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePaths {
    /// Template for the runtime constants file
    pub runtime: String,
    /// Template for the editor-only listing file
    pub list: String,
    /// Template for the editor-only key to value lookup file
    pub lookup: String,
}

impl Default for TemplatePaths {
    fn default() -> Self {
        Self {
            runtime: "templates/runtime.cs.tmpl".to_string(),
            list: "templates/list.cs.tmpl".to_string(),
            lookup: "templates/lookup.cs.tmpl".to_string(),
        }
    }
}

impl TemplatePaths {
    /// Resolve all three identifiers to paths
    pub fn resolve(&self, base_dir: &Path) -> ResolvedTemplatePaths {
        let resolve = |id: &str| {
            let path = Path::new(id);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            }
        };

        ResolvedTemplatePaths {
            runtime: resolve(&self.runtime),
            list: resolve(&self.list),
            lookup: resolve(&self.lookup),
        }
    }
}

/// Template identifiers resolved to file system paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplatePaths {
    pub runtime: PathBuf,
    pub list: PathBuf,
    pub lookup: PathBuf,
}

/// Change-watch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// File whose changes trigger regeneration
    pub path: Option<PathBuf>,
    /// Minimum seconds between two watcher ticks doing work
    pub tick_rate_secs: f64,
    /// Scheduler tick in milliseconds
    pub min_tick_ms: u64,
    /// Logic IDs regenerated on change; empty means all items
    pub logic_ids: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            path: None,
            tick_rate_secs: 3.0,
            min_tick_ms: 100,
            logic_ids: Vec::new(),
        }
    }
}

/// One configured generation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorItem {
    /// Selects the data-source adapter
    pub logic_id: String,
    /// Inactive items are skipped
    pub is_active: bool,
    /// Whether the list and lookup files are produced
    pub create_editor_only_lookup: bool,

    pub class_name_list: String,
    pub class_name_lookup: String,
    pub class_name_keys: String,
    pub namespace: String,
    pub namespace_runtime: String,

    /// Input file for the adapter, relative to the data root
    pub source_path: String,

    /// Directory of the runtime file, relative to the data root
    pub output_path: String,
    /// Directory of the editor-only files, relative to the data root
    pub output_editor_path: String,
}

impl Default for GeneratorItem {
    fn default() -> Self {
        Self {
            logic_id: String::new(),
            is_active: true,
            create_editor_only_lookup: true,
            class_name_list: "List".to_string(),
            class_name_lookup: "Lookup".to_string(),
            class_name_keys: "Keys".to_string(),
            namespace: "Generator".to_string(),
            namespace_runtime: "Generator.Runtime".to_string(),
            source_path: String::new(),
            output_path: "Generated/Localization".to_string(),
            output_editor_path: "Generated/Localization/Editor".to_string(),
        }
    }
}

impl GeneratorItem {
    /// Create an item with defaults for the given logic ID
    pub fn new(logic_id: impl Into<String>) -> Self {
        Self {
            logic_id: logic_id.into(),
            ..Default::default()
        }
    }

    /// Whether the item is active and included by the filter, if one is given
    pub fn is_selected(&self, filter: Option<&[String]>) -> bool {
        self.is_active && filter.map_or(true, |ids| ids.iter().any(|id| *id == self.logic_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_item_defaults() {
        let item = GeneratorItem::new("loca-json");
        assert_eq!(item.logic_id, "loca-json");
        assert!(item.is_active);
        assert!(item.create_editor_only_lookup);
        assert_eq!(item.class_name_keys, "Keys");
        assert_eq!(item.class_name_list, "List");
        assert_eq!(item.class_name_lookup, "Lookup");
        assert_eq!(item.namespace, "Generator");
        assert_eq!(item.namespace_runtime, "Generator.Runtime");
        assert_eq!(item.output_path, "Generated/Localization");
        assert_eq!(item.output_editor_path, "Generated/Localization/Editor");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_template() {
        let mut settings = Settings::default();
        settings.templates.list = "  ".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("templates.list"));
    }

    #[test]
    fn test_validate_rejects_non_positive_tick_rate() {
        let mut settings = Settings::default();
        settings.watch.tick_rate_secs = 0.0;
        assert!(settings.validate().is_err());

        settings.watch.tick_rate_secs = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_logic_id() {
        let mut settings = Settings::default();
        settings.generators.push(GeneratorItem::default());
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("generators[0].logic_id"));
    }

    #[test]
    fn test_selected_items_honours_active_flag_and_filter() {
        let mut settings = Settings::default();
        settings.generators.push(GeneratorItem::new("a"));
        settings.generators.push(GeneratorItem {
            is_active: false,
            ..GeneratorItem::new("b")
        });
        settings.generators.push(GeneratorItem::new("c"));

        let all: Vec<_> = settings.selected_items(None).map(|i| i.logic_id.as_str()).collect();
        assert_eq!(all, vec!["a", "c"]);

        let filter = vec!["c".to_string(), "b".to_string()];
        let filtered: Vec<_> = settings
            .selected_items(Some(filter.as_slice()))
            .map(|i| i.logic_id.as_str())
            .collect();
        assert_eq!(filtered, vec!["c"]);
    }

    #[test]
    fn test_template_paths_resolve() {
        let paths = TemplatePaths {
            runtime: "t/runtime.tmpl".to_string(),
            list: "/abs/list.tmpl".to_string(),
            lookup: "lookup.tmpl".to_string(),
        };
        let resolved = paths.resolve(Path::new("/project"));
        assert_eq!(resolved.runtime, PathBuf::from("/project/t/runtime.tmpl"));
        assert_eq!(resolved.list, PathBuf::from("/abs/list.tmpl"));
        assert_eq!(resolved.lookup, PathBuf::from("/project/lookup.tmpl"));
    }
}
