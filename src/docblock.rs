//! Doc block data model
//!
//! A `DocBlock` is the structured documentation unit attached to a
//! declaration: three narrative sections (`what`, `why`, `guardrails`)
//! supplied by an external collaborator, plus an optional metadata section
//! that is always recomputed deterministically and never hand-merged.
//!
//! `CommentStyle` maps the language-neutral body lines into each language
//! family's native comment or docstring syntax and back.

use serde::{Deserialize, Serialize};

/// Human-readable prose supplied by the narrative collaborator.
///
/// The engine treats these fields as opaque text; it never inspects or
/// rewrites them beyond locating section boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub what: String,
    pub why: String,
    #[serde(default)]
    pub guardrails: Vec<String>,
}

/// One entry of the revision history for a declaration's line range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ChangelogEntry {
    /// A revision that matched the strict changelog line pattern.
    Revision {
        date: String,
        message: String,
        short_id: String,
    },
    /// Version control could not be queried. Distinguishes "checked, found
    /// nothing" (an empty list) from "not checked".
    Unavailable,
}

impl ChangelogEntry {
    pub fn render(&self) -> String {
        match self {
            ChangelogEntry::Revision {
                date,
                message,
                short_id,
            } => format!("- {date}: {message} ({short_id})"),
            ChangelogEntry::Unavailable => "- no history available".to_string(),
        }
    }
}

/// Deterministically collected metadata. When present it fully replaces any
/// prior metadata section; partial merges are forbidden.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Callee names inside the declaration subtree, sorted and deduplicated
    pub calls: Vec<String>,
    /// Top-level import identifiers of the file, sorted and deduplicated
    pub imports: Vec<String>,
    /// Most recent revisions touching the declaration's line range
    pub changelog: Vec<ChangelogEntry>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.imports.is_empty() && self.changelog.is_empty()
    }

    /// Render the metadata section as language-neutral body lines, starting
    /// with the `Metadata:` header. Empty sub-fields are omitted.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec!["Metadata:".to_string()];
        if !self.calls.is_empty() {
            lines.push(format!("  calls: {}", self.calls.join(", ")));
        }
        if !self.imports.is_empty() {
            lines.push(format!("  imports: {}", self.imports.join(", ")));
        }
        if !self.changelog.is_empty() {
            lines.push("  changelog:".to_string());
            for entry in &self.changelog {
                lines.push(format!("    {}", entry.render()));
            }
        }
        lines
    }
}

/// The structured documentation unit: narrative plus optional metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    pub narrative: Narrative,
    pub metadata: Option<Metadata>,
}

impl DocBlock {
    pub fn new(narrative: Narrative) -> Self {
        Self {
            narrative,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Render the full block as language-neutral body lines.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push("What:".to_string());
        for text_line in self.narrative.what.lines() {
            lines.push(format!("  {text_line}"));
        }
        lines.push("Why:".to_string());
        for text_line in self.narrative.why.lines() {
            lines.push(format!("  {text_line}"));
        }
        lines.push("Guardrails:".to_string());
        for rail in &self.narrative.guardrails {
            lines.push(format!("  - {rail}"));
        }
        if let Some(metadata) = &self.metadata {
            lines.extend(metadata.to_lines());
        }
        lines
    }
}

/// A language family's comment/docstring convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// Triple-quoted string placed inside the declaration body (Python)
    DocString {
        open: &'static str,
        close: &'static str,
    },
    /// Delimited block comment above the header (JavaScript `/** */`)
    Block {
        open: &'static str,
        line: &'static str,
        close: &'static str,
    },
    /// A run of prefixed comment lines above the header (Rust `///`, Go `//`)
    Line { prefix: &'static str },
}

impl CommentStyle {
    pub const PYTHON_DOCSTRING: CommentStyle = CommentStyle::DocString {
        open: "\"\"\"",
        close: "\"\"\"",
    };
    pub const JS_BLOCK: CommentStyle = CommentStyle::Block {
        open: "/**",
        line: " * ",
        close: " */",
    };
    pub const RUST_DOC_LINE: CommentStyle = CommentStyle::Line { prefix: "/// " };
    pub const GO_LINE: CommentStyle = CommentStyle::Line { prefix: "// " };

    /// The open/close delimiter pair, or a single token for line styles.
    pub fn delimiters(&self) -> (&'static str, Option<&'static str>) {
        match self {
            CommentStyle::DocString { open, close } => (open, Some(close)),
            CommentStyle::Block { open, close, .. } => (open, Some(close)),
            CommentStyle::Line { prefix } => (prefix.trim_end(), None),
        }
    }

    /// Decorate neutral body lines into source lines at `indent`.
    pub fn render(&self, body: &[String], indent: &str) -> Vec<String> {
        let mut out = Vec::with_capacity(body.len() + 2);
        match self {
            CommentStyle::DocString { open, close } => {
                out.push(format!("{indent}{open}"));
                for line in body {
                    out.push(decorated(indent, "", line));
                }
                out.push(format!("{indent}{close}"));
            }
            CommentStyle::Block { open, line, close } => {
                out.push(format!("{indent}{open}"));
                for body_line in body {
                    out.push(decorated(indent, line, body_line));
                }
                out.push(format!("{indent}{close}"));
            }
            CommentStyle::Line { prefix } => {
                for line in body {
                    out.push(decorated(indent, prefix, line));
                }
            }
        }
        out
    }

    /// Undo `render`: recover neutral body lines from raw source lines.
    ///
    /// Returns `None` for a malformed block (for example an unterminated
    /// docstring), which callers must treat as "no block found" rather than
    /// a partial match.
    pub fn strip(&self, raw: &[&str]) -> Option<Vec<String>> {
        match self {
            CommentStyle::DocString { open, close } => strip_delimited(raw, open, close, ""),
            CommentStyle::Block { open, close, .. } => strip_delimited(raw, open, close, "*"),
            CommentStyle::Line { prefix } => {
                let token = prefix.trim_end();
                let mut body = Vec::with_capacity(raw.len());
                for line in raw {
                    let trimmed = line.trim_start();
                    let rest = trimmed.strip_prefix(token)?;
                    body.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
                }
                Some(body)
            }
        }
    }
}

fn decorated(indent: &str, prefix: &str, line: &str) -> String {
    let rendered = format!("{indent}{prefix}{line}");
    rendered.trim_end().to_string()
}

/// Strip a delimited block: first line opens, last line closes, interior
/// lines lose the base indent and an optional `interior` marker.
fn strip_delimited(raw: &[&str], open: &str, close: &str, interior: &str) -> Option<Vec<String>> {
    let first = raw.first()?;
    let indent_len = first.len() - first.trim_start().len();
    let after_open = first.trim_start().strip_prefix(open)?;

    if raw.len() == 1 {
        // Single-line form: open and close on one line.
        let inner = after_open.strip_suffix(close)?;
        return if inner.trim().is_empty() {
            Some(Vec::new())
        } else {
            Some(vec![inner.trim().to_string()])
        };
    }

    let last = raw.last()?;
    if !last.trim_end().ends_with(close) {
        return None;
    }

    let mut body = Vec::with_capacity(raw.len());
    if !after_open.trim().is_empty() {
        body.push(after_open.trim_start().to_string());
    }
    for line in &raw[1..raw.len() - 1] {
        let mut rest = if line.len() >= indent_len && line.is_char_boundary(indent_len) {
            &line[indent_len..]
        } else {
            line.trim_start()
        };
        if !interior.is_empty() {
            let trimmed = rest.trim_start();
            if let Some(after_marker) = trimmed.strip_prefix(interior) {
                rest = after_marker.strip_prefix(' ').unwrap_or(after_marker);
            }
        }
        body.push(rest.trim_end().to_string());
    }
    let closing = last.trim_end();
    let before_close = &closing[..closing.len() - close.len()];
    let leftover = before_close.trim();
    if !leftover.is_empty() {
        body.push(leftover.to_string());
    }
    Some(body)
}
