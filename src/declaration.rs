//! Declaration data model
//!
//! A `Declaration` is a function, method, or type definition targeted for
//! documentation. It is computed fresh from the concrete syntax tree on every
//! call and never cached across mutations, because line numbers shift after
//! each edit.

use serde::Serialize;

/// A half-open range of 0-based line indices, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocSpan {
    pub start: usize,
    pub end: usize,
}

impl DocSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span at `at`, used as a pure insertion point.
    pub fn insertion_at(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A documentable declaration located in a source file.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    /// Declaration name (function, method, or type name)
    pub name: String,
    /// 1-based line where the declaration header starts
    pub start_line: u32,
    /// 1-based line where the declaration ends (inclusive)
    pub end_line: u32,
    /// Whitespace prefix of the header line
    pub indent: String,
    /// Line span of a pre-existing doc block adjacent to the header, if any
    pub doc_span: Option<DocSpan>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, start_line: u32, end_line: u32, indent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_line,
            end_line,
            indent: indent.into(),
            doc_span: None,
        }
    }

    pub fn with_doc_span(mut self, span: DocSpan) -> Self {
        self.doc_span = Some(span);
        self
    }

    /// The declaration's source text, sliced out of `source` by line range.
    pub fn snippet(&self, source: &str) -> String {
        let start = self.start_line.saturating_sub(1) as usize;
        let end = self.end_line as usize;
        source
            .lines()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_empty() {
        let span = DocSpan::new(3, 7);
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        assert!(DocSpan::insertion_at(5).is_empty());
    }

    #[test]
    fn snippet_slices_line_range() {
        let source = "a\nb\nc\nd\n";
        let decl = Declaration::new("b_to_c", 2, 3, "");
        assert_eq!(decl.snippet(source), "b\nc");
    }
}
