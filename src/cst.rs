//! Concrete syntax tree provider
//!
//! Wraps a tree-sitter grammar for one language. Parse failures surface as
//! error/missing nodes inside the tree rather than exceptions; `validate`
//! turns those nodes into a typed error carrying the offending region.

use crate::{Error, Result};
use tree_sitter::{Language, Node, Parser, Tree};

/// A parser handle for one language grammar.
///
/// Construction probes the grammar once so that an ABI-incompatible or
/// missing grammar fails fast at adapter registration, not mid-mutation.
pub struct TreeProvider {
    language: Language,
    name: &'static str,
}

impl TreeProvider {
    pub fn new(name: &'static str, language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| Error::ParseUnavailable(format!("{name}: {e}")))?;
        Ok(Self { language, name })
    }

    pub fn language_name(&self) -> &'static str {
        self.name
    }

    /// Parse `source` into a tree. Malformed input still yields a tree, with
    /// the damage reported as error nodes.
    pub fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| Error::ParseUnavailable(format!("{}: {e}", self.name)))?;
        parser
            .parse(source, None)
            .ok_or_else(|| Error::ParseUnavailable(format!("{}: parser produced no tree", self.name)))
    }

    /// Re-parse `source` and succeed iff the tree contains no error or
    /// missing nodes.
    pub fn validate(&self, source: &str) -> Result<()> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if !root.has_error() {
            return Ok(());
        }
        let (line, detail) = first_error_region(root)
            .unwrap_or((root.start_position().row as u32 + 1, "parse error".to_string()));
        Err(Error::SyntaxInvalid { line, detail })
    }
}

/// Depth-first search for the first error or missing node, returning its
/// 1-based line and a short description.
pub fn first_error_region(node: Node<'_>) -> Option<(u32, String)> {
    if node.is_error() {
        return Some((
            node.start_position().row as u32 + 1,
            format!(
                "error node spanning lines {}-{}",
                node.start_position().row + 1,
                node.end_position().row + 1
            ),
        ));
    }
    if node.is_missing() {
        return Some((
            node.start_position().row as u32 + 1,
            format!("missing {}", node.kind()),
        ));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !child.has_error() && !child.is_missing() {
            continue;
        }
        if let Some(found) = first_error_region(child) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> TreeProvider {
        TreeProvider::new("Python", tree_sitter_python::LANGUAGE.into()).unwrap()
    }

    #[test]
    fn valid_source_passes_validation() {
        let provider = python();
        assert!(provider.validate("def f():\n    return 1\n").is_ok());
    }

    #[test]
    fn broken_source_reports_offending_region() {
        let provider = python();
        let err = provider.validate("def f(:\n    return 1\n").unwrap_err();
        match err {
            Error::SyntaxInvalid { line, .. } => assert!(line >= 1),
            other => panic!("expected SyntaxInvalid, got {other:?}"),
        }
    }

    #[test]
    fn parse_is_tolerant_of_broken_input() {
        let provider = python();
        let tree = provider.parse("def broken(").unwrap();
        assert!(tree.root_node().has_error());
    }
}
