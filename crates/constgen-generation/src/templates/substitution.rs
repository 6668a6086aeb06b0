//! Placeholder substitution and block assembly

use constgen_storage::GeneratorItem;

use super::markers::ParsedTemplate;

/// Entry key placeholder
pub const CONST_KEY: &str = "%constKey";
/// Normalized entry value placeholder
pub const CONST_VALUE: &str = "%constValue";
/// Key type name placeholder
pub const CONST_TYPE: &str = "%constType";
/// Entry comment placeholder, empty when the entry has none
pub const CONST_COMMENT: &str = "%constComment";

pub const CLASS_NAME_KEYS: &str = "//%classNameKeys";
pub const CLASS_NAME_LIST: &str = "//%classNameList";
pub const CLASS_NAME_LOOKUP: &str = "//%classNameLookup";
pub const NAMESPACE: &str = "//%namespace";
pub const NAMESPACE_RUNTIME: &str = "//%namespaceRuntime";

/// Named placeholder bindings
///
/// Tokens are matched literally. When one token is a prefix of another the
/// longer one wins, so `//%namespaceRuntime` is never clipped by
/// `//%namespace`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    bindings: Vec<(String, String)>,
}

impl Placeholders {
    /// Create an empty binding set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a token, replacing any previous binding for it
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.bindings.iter_mut().find(|(t, _)| *t == token) {
            Some(binding) => binding.1 = value,
            None => self.bindings.push((token, value)),
        }
    }

    /// Builder form of [`Placeholders::insert`]
    pub fn bind(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    /// Bindings for one entry line
    pub fn for_entry(key: &str, value: &str, type_name: &str, comment: Option<&str>) -> Self {
        Self::new()
            .bind(CONST_KEY, key)
            .bind(CONST_VALUE, value)
            .bind(CONST_TYPE, type_name)
            .bind(CONST_COMMENT, comment.unwrap_or_default())
    }

    /// Value bound to a token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn longest_first(&self) -> Vec<(&str, &str)> {
        let mut ordered: Vec<(&str, &str)> = self
            .bindings
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .map(|(token, value)| (token.as_str(), value.as_str()))
            .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        ordered
    }
}

/// Expands line templates and assembles final file contents
pub struct SubstitutionEngine;

impl SubstitutionEngine {
    /// Replace every bound token in `template` with its value
    ///
    /// The template is scanned once from left to right. Substituted values
    /// are never rescanned, so a value that happens to contain token text
    /// is emitted literally.
    pub fn expand(template: &str, placeholders: &Placeholders) -> String {
        let tokens = placeholders.longest_first();
        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        'scan: while !rest.is_empty() {
            for (token, value) in &tokens {
                if let Some(tail) = rest.strip_prefix(token) {
                    output.push_str(value);
                    rest = tail;
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                output.push(ch);
            }
            rest = chars.as_str();
        }

        output
    }

    /// Substitute the item's name tokens into the template, then inject the block
    ///
    /// Only template text sees the name tokens. Entry data in `block` is
    /// inserted untouched.
    pub fn assemble(parsed: &ParsedTemplate, block: &str, names: &NameTokens) -> String {
        names.apply_to(parsed).inject_block(block)
    }
}

/// Accumulates the expanded lines of one template for a sequence of entries
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    line_template: Option<String>,
    comment_template: Option<String>,
    type_name: String,
    block: String,
    data_lines: usize,
    comment_lines: usize,
}

impl BlockBuilder {
    /// Builder for a parsed template whose entries have keys of `type_name`
    pub fn new(parsed: &ParsedTemplate, type_name: impl Into<String>) -> Self {
        Self {
            line_template: parsed.line_template().map(str::to_string),
            comment_template: parsed.comment_line_template().map(str::to_string),
            type_name: type_name.into(),
            block: String::new(),
            data_lines: 0,
            comment_lines: 0,
        }
    }

    /// Append the lines for one entry
    ///
    /// A comment line is emitted only when the entry has a comment and the
    /// template has a comment-line marker. Nothing is emitted when the
    /// template has no repeat-line marker.
    pub fn push(&mut self, key: &str, value: &str, comment: Option<&str>) {
        let Some(line_template) = &self.line_template else {
            return;
        };
        let placeholders = Placeholders::for_entry(key, value, &self.type_name, comment);

        if let (Some(_), Some(comment_template)) = (comment, &self.comment_template) {
            self.block
                .push_str(&SubstitutionEngine::expand(comment_template, &placeholders));
            self.block.push('\n');
            self.comment_lines += 1;
        }

        self.block
            .push_str(&SubstitutionEngine::expand(line_template, &placeholders));
        self.block.push('\n');
        self.data_lines += 1;
    }

    pub fn data_lines(&self) -> usize {
        self.data_lines
    }

    pub fn comment_lines(&self) -> usize {
        self.comment_lines
    }

    /// The accumulated block
    pub fn finish(self) -> String {
        self.block
    }
}

/// Class name and namespace tokens of one generator item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTokens {
    placeholders: Placeholders,
}

impl NameTokens {
    pub fn from_item(item: &GeneratorItem) -> Self {
        let placeholders = Placeholders::new()
            .bind(CLASS_NAME_KEYS, &item.class_name_keys)
            .bind(CLASS_NAME_LIST, &item.class_name_list)
            .bind(CLASS_NAME_LOOKUP, &item.class_name_lookup)
            .bind(NAMESPACE, &item.namespace)
            .bind(NAMESPACE_RUNTIME, &item.namespace_runtime);
        Self { placeholders }
    }

    /// Replace every name token in `text`
    pub fn apply(&self, text: &str) -> String {
        SubstitutionEngine::expand(text, &self.placeholders)
    }

    /// Replace every name token in the lines of a parsed template
    pub fn apply_to(&self, parsed: &ParsedTemplate) -> ParsedTemplate {
        parsed.map_lines(|line| self.apply(line))
    }
}
