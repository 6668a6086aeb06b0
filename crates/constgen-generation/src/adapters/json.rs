//! Built-in JSON data sources
//!
//! `loca-json` reads the localization key file format:
//!
//! ```json
//! { "translations": { "1": "Hello", "2": "Good Bye" },
//!   "comments": { "Hello": "Shown on start" } }
//! ```
//!
//! The `json-*` adapters read `{ "entries": {...}, "comments": {...} }` and
//! parse every key into their key kind. Comments are keyed by the
//! normalized value. Object order is kept.

use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{AdapterContext, AdapterRegistration, DataSourceAdapter};
use crate::error::{GenerationError, GenerationResult};
use crate::lookup::{FloatKey, LookupKey, LookupModel, LookupSource};

const LOCA_JSON_DESCRIPTION: &str = "Localization keys from a translations JSON file";
const JSON_STRINGS_DESCRIPTION: &str = "String keys from an entries JSON file";
const JSON_INTS_DESCRIPTION: &str = "Integer keys from an entries JSON file";
const JSON_FLOATS_DESCRIPTION: &str = "Float keys from an entries JSON file";
const JSON_BOOLS_DESCRIPTION: &str = "Boolean keys from an entries JSON file";

inventory::submit! {
    AdapterRegistration::new("loca-json", LOCA_JSON_DESCRIPTION, create_loca_json)
}
inventory::submit! {
    AdapterRegistration::new("json-strings", JSON_STRINGS_DESCRIPTION, create_json_strings)
}
inventory::submit! {
    AdapterRegistration::new("json-ints", JSON_INTS_DESCRIPTION, create_json_ints)
}
inventory::submit! {
    AdapterRegistration::new("json-floats", JSON_FLOATS_DESCRIPTION, create_json_floats)
}
inventory::submit! {
    AdapterRegistration::new("json-bools", JSON_BOOLS_DESCRIPTION, create_json_bools)
}

fn create_loca_json() -> Arc<dyn DataSourceAdapter> {
    Arc::new(LocaJsonAdapter)
}

fn create_json_strings() -> Arc<dyn DataSourceAdapter> {
    Arc::new(JsonEntriesAdapter::<String>::new("json-strings", JSON_STRINGS_DESCRIPTION))
}

fn create_json_ints() -> Arc<dyn DataSourceAdapter> {
    Arc::new(JsonEntriesAdapter::<i64>::new("json-ints", JSON_INTS_DESCRIPTION))
}

fn create_json_floats() -> Arc<dyn DataSourceAdapter> {
    Arc::new(JsonEntriesAdapter::<FloatKey>::new("json-floats", JSON_FLOATS_DESCRIPTION))
}

fn create_json_bools() -> Arc<dyn DataSourceAdapter> {
    Arc::new(JsonEntriesAdapter::<bool>::new("json-bools", JSON_BOOLS_DESCRIPTION))
}

/// A key type that can be read from a JSON object key
pub trait ParseKey: LookupKey + Sized {
    fn parse_key(raw: &str) -> Option<Self>;
}

impl ParseKey for String {
    fn parse_key(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ParseKey for i64 {
    fn parse_key(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ParseKey for FloatKey {
    fn parse_key(raw: &str) -> Option<Self> {
        raw.trim().parse::<f32>().ok().filter(|v| v.is_finite()).map(FloatKey)
    }
}

impl ParseKey for bool {
    fn parse_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocaDocument {
    #[serde(default)]
    translations: IndexMap<String, String>,
    #[serde(default)]
    comments: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EntriesDocument {
    #[serde(default)]
    entries: IndexMap<String, String>,
    #[serde(default)]
    comments: IndexMap<String, String>,
}

fn read_document<T: DeserializeOwned>(path: &Path) -> GenerationResult<T> {
    let content = fs::read_to_string(path).map_err(|source| GenerationError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| GenerationError::source_parse(path, e.to_string()))
}

/// Localization keys, string-keyed
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaJsonAdapter;

impl DataSourceAdapter for LocaJsonAdapter {
    fn logic_id(&self) -> &str {
        "loca-json"
    }

    fn description(&self) -> &str {
        LOCA_JSON_DESCRIPTION
    }

    fn build(&self, context: &AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>> {
        let path = context.source_path();
        let document: LocaDocument = read_document(&path)?;

        let mut model: LookupModel<String> = document.translations.into_iter().collect();
        for (value, comment) in document.comments {
            model.insert_comment(value, comment);
        }

        debug!(path = %path.display(), entries = model.len(), "Loaded localization keys");
        Ok(Box::new(model))
    }
}

/// Entries of one key kind
pub struct JsonEntriesAdapter<K> {
    logic_id: &'static str,
    description: &'static str,
    _key: PhantomData<fn() -> K>,
}

impl<K: ParseKey> JsonEntriesAdapter<K> {
    pub const fn new(logic_id: &'static str, description: &'static str) -> Self {
        Self {
            logic_id,
            description,
            _key: PhantomData,
        }
    }
}

impl<K: ParseKey> DataSourceAdapter for JsonEntriesAdapter<K> {
    fn logic_id(&self) -> &str {
        self.logic_id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn build(&self, context: &AdapterContext<'_>) -> GenerationResult<Box<dyn LookupSource>> {
        let path = context.source_path();
        let document: EntriesDocument = read_document(&path)?;

        let mut model = LookupModel::<K>::new();
        for (raw_key, value) in document.entries {
            let key = K::parse_key(&raw_key).ok_or_else(|| {
                GenerationError::source_parse(
                    &path,
                    format!("key '{}' is not a valid {}", raw_key, K::kind()),
                )
            })?;
            if model.insert(key, value).is_some() {
                return Err(GenerationError::source_parse(
                    &path,
                    format!("key '{}' appears twice as {}", raw_key, K::kind()),
                ));
            }
        }
        for (value, comment) in document.comments {
            model.insert_comment(value, comment);
        }

        debug!(
            logic_id = self.logic_id,
            path = %path.display(),
            entries = model.len(),
            "Loaded entries"
        );
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterRegistry;
    use crate::lookup::Entry;
    use constgen_storage::GeneratorItem;
    use tempfile::TempDir;

    fn build_with(
        adapter: &dyn DataSourceAdapter,
        json: &str,
    ) -> GenerationResult<Box<dyn LookupSource>> {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("source.json"), json).unwrap();
        let item = GeneratorItem {
            source_path: "source.json".to_string(),
            ..GeneratorItem::new(adapter.logic_id())
        };
        adapter.build(&AdapterContext::new(&item, dir.path()))
    }

    #[test]
    fn test_loca_json_keeps_order_and_comments() {
        let model = build_with(
            &LocaJsonAdapter,
            r#"{"translations": {"2": "Good Bye", "1": "Hello"}, "comments": {"Hello": "greeting"}}"#,
        )
        .unwrap();

        assert_eq!(model.type_name(), "string");
        let entries: Vec<Entry> = model.entries().collect();
        assert_eq!(entries[0].key, "2");
        assert_eq!(entries[0].value, "Good_Bye");
        assert_eq!(entries[1].comment.as_deref(), Some("greeting"));
    }

    #[test]
    fn test_loca_json_without_translations_is_empty() {
        let model = build_with(&LocaJsonAdapter, "{}").unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_json_ints_parses_keys() {
        let adapter = JsonEntriesAdapter::<i64>::new("json-ints", JSON_INTS_DESCRIPTION);
        let model = build_with(&adapter, r#"{"entries": {"10": "Ten", "-1": "Minus One"}}"#).unwrap();
        assert_eq!(model.type_name(), "int");
        let keys: Vec<String> = model.entries().map(|e| e.key).collect();
        assert_eq!(keys, vec!["10", "-1"]);
    }

    #[test]
    fn test_json_floats_and_bools() {
        let floats = JsonEntriesAdapter::<FloatKey>::new("json-floats", JSON_FLOATS_DESCRIPTION);
        let model = build_with(&floats, r#"{"entries": {"0.5": "Half"}}"#).unwrap();
        assert_eq!(model.type_name(), "float");
        assert_eq!(model.entries().next().unwrap().key, "0.5");

        let bools = JsonEntriesAdapter::<bool>::new("json-bools", JSON_BOOLS_DESCRIPTION);
        let model = build_with(&bools, r#"{"entries": {"TRUE": "On", "false": "Off"}}"#).unwrap();
        let keys: Vec<String> = model.entries().map(|e| e.key).collect();
        assert_eq!(keys, vec!["true", "false"]);
    }

    #[test]
    fn test_discovered_adapters_describe_themselves() {
        let registry = AdapterRegistry::discover();
        for registration in inventory::iter::<AdapterRegistration> {
            let adapter = registry.get(registration.logic_id).unwrap();
            assert_eq!(adapter.description(), registration.description);
        }
        assert_eq!(
            registry.get("json-bools").unwrap().description(),
            "Boolean keys from an entries JSON file"
        );
    }

    #[test]
    fn test_invalid_key_is_source_parse_error() {
        let adapter = JsonEntriesAdapter::<i64>::new("json-ints", JSON_INTS_DESCRIPTION);
        let err = build_with(&adapter, r#"{"entries": {"one": "1"}}"#).err().unwrap();
        assert!(matches!(err, GenerationError::SourceParse { .. }));
        assert!(err.to_string().contains("'one'"));
    }

    #[test]
    fn test_keys_equal_after_parsing_are_rejected() {
        let adapter = JsonEntriesAdapter::<i64>::new("json-ints", JSON_INTS_DESCRIPTION);
        let err = build_with(&adapter, r#"{"entries": {"1": "a", "01": "b"}}"#).err().unwrap();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_malformed_json_is_source_parse_error() {
        let err = build_with(&LocaJsonAdapter, "{ not json").err().unwrap();
        assert!(matches!(err, GenerationError::SourceParse { .. }));
    }

    #[test]
    fn test_missing_source_is_unreadable_error() {
        let item = GeneratorItem {
            source_path: "missing.json".to_string(),
            ..GeneratorItem::new("loca-json")
        };
        let dir = TempDir::new().unwrap();
        let err = LocaJsonAdapter
            .build(&AdapterContext::new(&item, dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, GenerationError::SourceUnreadable { .. }));
    }
}
