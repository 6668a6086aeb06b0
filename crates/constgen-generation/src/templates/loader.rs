//! Template loading
//!
//! Templates are read and scanned at most once per run. The cache lives in
//! the run state and is dropped with it, so edits to a template are picked
//! up by the next run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use constgen_storage::ResolvedTemplatePaths;
use tracing::debug;

use super::markers::{ParsedTemplate, TemplateMarkerParser};
use super::TemplateKind;
use crate::error::{GenerationError, GenerationResult};

/// Per-run cache of parsed templates
#[derive(Debug)]
pub struct TemplateCache {
    paths: ResolvedTemplatePaths,
    cache: HashMap<TemplateKind, Arc<ParsedTemplate>>,
}

impl TemplateCache {
    /// Create an empty cache over resolved template paths
    pub fn new(paths: ResolvedTemplatePaths) -> Self {
        Self {
            paths,
            cache: HashMap::new(),
        }
    }

    /// Resolved path of a template kind
    pub fn path(&self, kind: TemplateKind) -> &Path {
        match kind {
            TemplateKind::Runtime => &self.paths.runtime,
            TemplateKind::List => &self.paths.list,
            TemplateKind::Lookup => &self.paths.lookup,
        }
    }

    /// Parsed template for `kind`, loading it on first use
    ///
    /// A failed load is not cached.
    pub fn get(&mut self, kind: TemplateKind) -> GenerationResult<Arc<ParsedTemplate>> {
        if let Some(parsed) = self.cache.get(&kind) {
            return Ok(Arc::clone(parsed));
        }

        let path = self.path(kind).to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| GenerationError::TemplateUnreadable {
            kind,
            path: path.clone(),
            source,
        })?;

        let parsed = Arc::new(TemplateMarkerParser::parse(&content));
        debug!(
            kind = %kind,
            path = %path.display(),
            repeat_line = parsed.has_repeat_line(),
            comment_line = parsed.comment_line_template().is_some(),
            "Loaded template"
        );

        self.cache.insert(kind, Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Number of templates loaded so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
