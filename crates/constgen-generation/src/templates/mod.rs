//! Template handling for constants generation
//!
//! Provides marker scanning, per-entry line substitution, and template loading.

pub mod loader;
pub mod markers;
pub mod substitution;

use std::fmt;

pub use loader::TemplateCache;
pub use markers::{
    MarkerSite, ParsedTemplate, TemplateMarkerParser, COMMENT_LINE_MARKER, COMMENT_SIGN, MARKER_PREFIX,
    PARAM_SIGN, REPEAT_LINE_MARKER,
};
pub use substitution::{
    BlockBuilder, NameTokens, Placeholders, SubstitutionEngine, CLASS_NAME_KEYS, CLASS_NAME_LIST,
    CLASS_NAME_LOOKUP, CONST_COMMENT, CONST_KEY, CONST_TYPE, CONST_VALUE, NAMESPACE,
    NAMESPACE_RUNTIME,
};

/// The three templates driven by every generator item, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKind {
    /// Runtime constants file
    Runtime,
    /// Editor-only listing file
    List,
    /// Editor-only key to value lookup file
    Lookup,
}

impl TemplateKind {
    /// All kinds in processing order
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Runtime, TemplateKind::List, TemplateKind::Lookup];

    /// Whether output for this kind is editor-only
    pub fn is_editor_only(&self) -> bool {
        !matches!(self, TemplateKind::Runtime)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Runtime => write!(f, "runtime"),
            TemplateKind::List => write!(f, "list"),
            TemplateKind::Lookup => write!(f, "lookup"),
        }
    }
}
