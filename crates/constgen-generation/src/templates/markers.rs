//! Template marker scanning
//!
//! Templates are plain text in the target language. A line carrying the
//! repeat-line marker (`//%0`) is the per-entry line template; a line
//! carrying the comment-line marker (`//%1`) is the optional per-entry
//! comment template. Only the first line carrying each marker is used;
//! later occurrences are passed through as literal text. A line carrying
//! both markers is the repeat line, and both markers are stripped from it.

/// Sign character that starts every placeholder token
pub const PARAM_SIGN: &str = "%";
/// Line comment sign of the target language
pub const COMMENT_SIGN: &str = "//";
/// Prefix of every line and name marker
pub const MARKER_PREFIX: &str = "//%";
/// Marks the line expanded once per entry
pub const REPEAT_LINE_MARKER: &str = "//%0";
/// Marks the line emitted before an entry's data line when it has a comment
pub const COMMENT_LINE_MARKER: &str = "//%1";

/// A marked line located in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSite {
    /// Zero-based line number
    pub line_index: usize,
    /// The line exactly as it appears in the template
    pub original_line: String,
    /// The line with its marker removed
    pub line_template: String,
}

/// Result of scanning a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    lines: Vec<String>,
    repeat: Option<MarkerSite>,
    comment: Option<MarkerSite>,
}

impl ParsedTemplate {
    /// Per-entry data line template, if the repeat-line marker was found
    pub fn line_template(&self) -> Option<&str> {
        self.repeat.as_ref().map(|site| site.line_template.as_str())
    }

    /// The unmodified repeat-marker line
    pub fn original_line(&self) -> Option<&str> {
        self.repeat.as_ref().map(|site| site.original_line.as_str())
    }

    /// Per-entry comment line template, if the comment-line marker was found
    pub fn comment_line_template(&self) -> Option<&str> {
        self.comment.as_ref().map(|site| site.line_template.as_str())
    }

    /// The unmodified comment-marker line
    pub fn original_comment_line(&self) -> Option<&str> {
        self.comment.as_ref().map(|site| site.original_line.as_str())
    }

    pub fn repeat_site(&self) -> Option<&MarkerSite> {
        self.repeat.as_ref()
    }

    pub fn comment_site(&self) -> Option<&MarkerSite> {
        self.comment.as_ref()
    }

    /// Whether the template can receive a data block
    pub fn has_repeat_line(&self) -> bool {
        self.repeat.is_some()
    }

    /// Full template text, every line newline-terminated
    pub fn base_text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Base text with the repeat-marker line replaced by `block`
    ///
    /// `block` is inserted as-is, so its lines must already be
    /// newline-terminated. The comment-marker line is dropped since its
    /// expansions live inside the block. Without a repeat-marker line the
    /// base text is returned unchanged.
    pub fn inject_block(&self, block: &str) -> String {
        let Some(repeat) = &self.repeat else {
            return self.base_text();
        };
        let comment_index = self.comment.as_ref().map(|site| site.line_index);

        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum::<usize>() + block.len());
        for (index, line) in self.lines.iter().enumerate() {
            if index == repeat.line_index {
                text.push_str(block);
            } else if Some(index) != comment_index {
                text.push_str(line);
                text.push('\n');
            }
        }
        text
    }

    /// Copy of the template with `f` applied to every line
    ///
    /// Marker positions are kept, so a later [`ParsedTemplate::inject_block`]
    /// still lands on the same line.
    pub fn map_lines(&self, f: impl Fn(&str) -> String) -> ParsedTemplate {
        let map_site = |site: &MarkerSite| MarkerSite {
            line_index: site.line_index,
            original_line: f(site.original_line.as_str()),
            line_template: f(site.line_template.as_str()),
        };
        ParsedTemplate {
            lines: self.lines.iter().map(|line| f(line.as_str())).collect(),
            repeat: self.repeat.as_ref().map(map_site),
            comment: self.comment.as_ref().map(map_site),
        }
    }
}

/// Scans templates for line markers
pub struct TemplateMarkerParser;

impl TemplateMarkerParser {
    /// Scan the template once, line by line
    ///
    /// A line carrying the repeat-line marker is never also taken as the
    /// comment line, and its line template carries neither marker.
    pub fn parse(content: &str) -> ParsedTemplate {
        let mut lines = Vec::new();
        let mut repeat = None;
        let mut comment = None;

        for (line_index, line) in content.lines().enumerate() {
            if repeat.is_none() && line.contains(REPEAT_LINE_MARKER) {
                repeat = Some(MarkerSite {
                    line_index,
                    original_line: line.to_string(),
                    line_template: line
                        .replace(REPEAT_LINE_MARKER, "")
                        .replace(COMMENT_LINE_MARKER, ""),
                });
            } else if comment.is_none() && line.contains(COMMENT_LINE_MARKER) {
                comment = Some(MarkerSite {
                    line_index,
                    original_line: line.to_string(),
                    line_template: line.replace(COMMENT_LINE_MARKER, ""),
                });
            }
            lines.push(line.to_string());
        }

        ParsedTemplate {
            lines,
            repeat,
            comment,
        }
    }
}
