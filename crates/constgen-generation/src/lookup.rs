//! Lookup models
//!
//! A lookup model normalizes a key/value collection of any supported key
//! type into the uniform [`Entry`] sequence consumed by the pipeline.
//! Each concrete data source builds one model per generation pass.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::{GenerationError, GenerationResult};

/// Callback invoked by [`LookupSource::transform_each`] with `(key, value, comment)`
pub type TransformFn = Box<dyn FnMut(&str, &str, Option<&str>)>;

/// Supported key kinds and the type names templates see for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Int,
    String,
    Float,
    Bool,
    /// User-defined enumeration, carrying its type name
    Custom(&'static str),
}

impl KeyKind {
    /// Canonical type name substituted for `%constType`
    pub fn type_name(&self) -> &'static str {
        match self {
            KeyKind::Int => "int",
            KeyKind::String => "string",
            KeyKind::Float => "float",
            KeyKind::Bool => "bool",
            KeyKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Replaces spaces in the value with underscores
pub fn default_cleanup(_key: &mut String, value: &mut String) {
    if value.contains(' ') {
        *value = value.replace(' ', "_");
    }
}

/// A key type a [`LookupModel`] can be keyed by
pub trait LookupKey: Eq + Hash + Clone + 'static {
    /// Kind of this key type
    fn kind() -> KeyKind;

    /// Deterministic string form of the key
    fn to_key_string(&self) -> String;

    /// Normalize a stringified key and its value before emission
    fn cleanup(key: &mut String, value: &mut String) {
        default_cleanup(key, value);
    }
}

impl LookupKey for i32 {
    fn kind() -> KeyKind {
        KeyKind::Int
    }

    fn to_key_string(&self) -> String {
        self.to_string()
    }
}

impl LookupKey for i64 {
    fn kind() -> KeyKind {
        KeyKind::Int
    }

    fn to_key_string(&self) -> String {
        self.to_string()
    }
}

impl LookupKey for String {
    fn kind() -> KeyKind {
        KeyKind::String
    }

    fn to_key_string(&self) -> String {
        self.clone()
    }
}

impl LookupKey for bool {
    fn kind() -> KeyKind {
        KeyKind::Bool
    }

    fn to_key_string(&self) -> String {
        self.to_string()
    }
}

/// `f32` key compared and hashed by bit pattern
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(pub f32);

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f32> for FloatKey {
    fn from(value: f32) -> Self {
        FloatKey(value)
    }
}

impl LookupKey for FloatKey {
    fn kind() -> KeyKind {
        KeyKind::Float
    }

    fn to_key_string(&self) -> String {
        self.0.to_string()
    }
}

/// One generated constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub comment: Option<String>,
}

/// Object-safe view of a lookup model used by the pipeline
pub trait LookupSource {
    /// Type name of the model's keys
    fn type_name(&self) -> &'static str;

    /// Number of entries
    fn len(&self) -> usize;

    /// Whether the model has no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy entry sequence in iteration order, cleanup and comment lookup applied
    fn entries(&self) -> Box<dyn Iterator<Item = Entry> + '_>;

    /// Register the callback driven by [`LookupSource::transform_each`]
    fn set_transform(&mut self, transform: TransformFn);

    /// Invoke the registered callback once per entry, in iteration order
    fn transform_each(&mut self) -> GenerationResult<()>;
}

/// Key/value mapping with optional comments keyed by normalized value
pub struct LookupModel<K: LookupKey> {
    lookup: IndexMap<K, String>,
    comment_lookup: HashMap<String, String>,
    transform: Option<TransformFn>,
}

/// String-keyed model
pub type StringLookupModel = LookupModel<String>;
/// Int-keyed model
pub type IntLookupModel = LookupModel<i64>;
/// Float-keyed model
pub type FloatLookupModel = LookupModel<FloatKey>;
/// Bool-keyed model
pub type BoolLookupModel = LookupModel<bool>;

impl<K: LookupKey> LookupModel<K> {
    /// Create an empty model
    pub fn new() -> Self {
        Self {
            lookup: IndexMap::new(),
            comment_lookup: HashMap::new(),
            transform: None,
        }
    }

    /// Insert a key/value pair, returning the previous value for that key
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: K, value: impl Into<String>) -> Option<String> {
        self.lookup.insert(key, value.into())
    }

    /// Attach a comment to a normalized value
    pub fn insert_comment(&mut self, value: impl Into<String>, comment: impl Into<String>) {
        self.comment_lookup.insert(value.into(), comment.into());
    }

    /// Whether any comment was registered
    pub fn has_comments(&self) -> bool {
        !self.comment_lookup.is_empty()
    }

    /// Comment for a normalized value, if any
    pub fn get_comment(&self, value: &str) -> Option<&str> {
        self.comment_lookup.get(value).map(String::as_str)
    }

    /// Canonical name of `K`
    pub fn type_name(&self) -> &'static str {
        K::kind().type_name()
    }

    fn entry_for(&self, key: &K, value: &str) -> Entry {
        let mut key = key.to_key_string();
        let mut value = value.to_string();
        K::cleanup(&mut key, &mut value);
        let comment = self.get_comment(&value).map(str::to_string);
        Entry {
            key,
            value,
            comment,
        }
    }
}

impl<K: LookupKey> Default for LookupModel<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: LookupKey, V: Into<String>> FromIterator<(K, V)> for LookupModel<K> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut model = Self::new();
        for (key, value) in iter {
            model.insert(key, value);
        }
        model
    }
}

impl<K: LookupKey> fmt::Debug for LookupModel<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupModel")
            .field("kind", &K::kind())
            .field("entries", &self.lookup.len())
            .field("comments", &self.comment_lookup.len())
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

impl<K: LookupKey> LookupSource for LookupModel<K> {
    fn type_name(&self) -> &'static str {
        LookupModel::type_name(self)
    }

    fn len(&self) -> usize {
        self.lookup.len()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry> + '_> {
        Box::new(
            self.lookup
                .iter()
                .map(move |(key, value)| self.entry_for(key, value)),
        )
    }

    fn set_transform(&mut self, transform: TransformFn) {
        self.transform = Some(transform);
    }

    fn transform_each(&mut self) -> GenerationResult<()> {
        let mut transform = self.transform.take().ok_or(GenerationError::TransformNotSet)?;
        for entry in self.entries() {
            transform(&entry.key, &entry.value, entry.comment.as_deref());
        }
        self.transform = Some(transform);
        Ok(())
    }
}
