//! Rust language adapter
//!
//! Doc blocks are `///` outer doc comments directly above the item header.

use super::framework::LanguageAdapter;
use super::treewalk::{self, ADJACENCY_WINDOW};
use crate::cst::TreeProvider;
use crate::declaration::Declaration;
use crate::docblock::{CommentStyle, Metadata};
use crate::mutate::{read_source, ComposedMutation};
use crate::{Error, Result};
use std::path::Path;
use tree_sitter::Node;

const DECL_KINDS: &[&str] = &[
    "function_item",
    // trait method stubs still accept a doc block above the header
    "function_signature_item",
    "struct_item",
    "enum_item",
    "trait_item",
    "mod_item",
];

/// Outer attributes sit between a doc run and the item header. They belong
/// to the header: the doc scan steps over them and a fresh block goes above
/// them.
fn header_attribute(line: &str) -> bool {
    line.trim_start().starts_with("#[")
}

pub struct RustAdapter {
    cst: TreeProvider,
}

impl RustAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cst: TreeProvider::new("Rust", tree_sitter_rust::LANGUAGE.into())?,
        })
    }

    fn name_of(node: Node<'_>, source: &str) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| treewalk::node_text(n, source).to_string())
    }

    /// Reduce a `use` argument to its module path: strip `as` renames,
    /// grouped tails and glob suffixes.
    fn normalize_use(text: &str) -> String {
        let text = text.trim();
        let text = text.split(" as ").next().unwrap_or(text).trim();
        if let Some(group) = text.find("::{") {
            return text[..group].to_string();
        }
        text.trim_end_matches("::*").trim_end_matches("::").to_string()
    }

    fn collect_imports(root: Node<'_>, source: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "use_declaration" {
                continue;
            }
            if let Some(argument) = child.child_by_field_name("argument") {
                let normalized = Self::normalize_use(treewalk::node_text(argument, source));
                if !normalized.is_empty() {
                    names.push(normalized);
                }
            }
        }
        crate::metadata::deterministic(names)
    }

    fn find_at_line<'t>(&self, root: Node<'t>, line: u32) -> Option<Node<'t>> {
        treewalk::find_declaration_at_line(root, line, DECL_KINDS)
    }
}

impl LanguageAdapter for RustAdapter {
    fn language_name(&self) -> &'static str {
        "Rust"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn comment_style(&self) -> CommentStyle {
        CommentStyle::RUST_DOC_LINE
    }

    fn locate_declaration(&self, path: &Path, source: &str, line: u32) -> Result<Declaration> {
        let tree = self.cst.parse(source)?;
        let node = self
            .find_at_line(tree.root_node(), line)
            .ok_or_else(|| Error::DeclarationNotFound {
                path: path.display().to_string(),
                line,
            })?;
        let name = Self::name_of(node, source).unwrap_or_default();
        let mut decl = treewalk::declaration_from_node(node, source, name);
        let lines: Vec<&str> = source.lines().collect();
        if let Some(span) = treewalk::comment_span_above(
            &lines,
            node.start_position().row,
            &self.comment_style(),
            ADJACENCY_WINDOW,
            header_attribute,
        ) {
            decl = decl.with_doc_span(span);
        }
        Ok(decl)
    }

    fn list_declarations(&self, source: &str) -> Vec<Declaration> {
        let Ok(tree) = self.cst.parse(source) else {
            return Vec::new();
        };
        treewalk::collect_nodes(tree.root_node(), DECL_KINDS)
            .into_iter()
            .map(|node| {
                let name = Self::name_of(node, source).unwrap_or_default();
                treewalk::declaration_from_node(node, source, name)
            })
            .collect()
    }

    fn extract_doc_block(&self, path: &Path, line: u32) -> Result<Option<String>> {
        let source = read_source(path)?;
        let tree = self.cst.parse(&source)?;
        let Some(node) = self.find_at_line(tree.root_node(), line) else {
            return Ok(None);
        };
        Ok(treewalk::extract_above(
            &source,
            node,
            &self.comment_style(),
            header_attribute,
        ))
    }

    fn insert_doc_block(&self, path: &Path, line: u32, body: &[String]) -> Result<()> {
        let source = read_source(path)?;
        let tree = self.cst.parse(&source)?;
        let node = self
            .find_at_line(tree.root_node(), line)
            .ok_or_else(|| Error::DeclarationNotFound {
                path: path.display().to_string(),
                line,
            })?;
        let indent = treewalk::declaration_from_node(node, &source, String::new()).indent;
        let content = treewalk::splice_above(
            &source,
            node,
            &self.comment_style(),
            body,
            &indent,
            header_attribute,
        );
        ComposedMutation::new(path, content)
            .validate(|candidate| self.validate_syntax(candidate))?
            .commit()
    }

    fn gather_metadata(&self, path: &Path, declaration_name: &str) -> Metadata {
        let Ok(source) = read_source(path) else {
            return Metadata::default();
        };
        let Ok(tree) = self.cst.parse(&source) else {
            return Metadata::default();
        };
        let root = tree.root_node();
        let Some(decl) =
            treewalk::find_declaration_by_name(root, DECL_KINDS, declaration_name, |n| {
                Self::name_of(n, &source)
            })
        else {
            return Metadata::default();
        };
        Metadata {
            calls: treewalk::collect_calls(
                decl,
                &source,
                &["call_expression"],
                "function",
                &[("field_expression", "field"), ("scoped_identifier", "name")],
            ),
            imports: Self::collect_imports(root, &source),
            changelog: Vec::new(),
        }
    }

    fn validate_syntax(&self, source: &str) -> Result<()> {
        self.cst.validate(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> RustAdapter {
        RustAdapter::new().unwrap()
    }

    fn write_temp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn insert_places_doc_lines_above() {
        let (_dir, path) = write_temp("fn run() {\n    helper();\n}\n\nfn helper() {}\n");
        let body = vec!["What:".to_string(), "  Runs".to_string()];
        adapter().insert_doc_block(&path, 1, &body).unwrap();

        let updated = std::fs::read_to_string(&path).unwrap();
        assert!(updated.starts_with("/// What:\n///   Runs\nfn run() {\n"));
        assert!(adapter().validate_syntax(&updated).is_ok());
    }

    #[test]
    fn insert_replaces_existing_doc_lines() {
        let (_dir, path) = write_temp("/// Old line one\n/// Old line two\nfn run() {}\n");
        adapter()
            .insert_doc_block(&path, 3, &["What:".to_string()])
            .unwrap();
        let updated = std::fs::read_to_string(&path).unwrap();
        assert_eq!(updated, "/// What:\nfn run() {}\n");
    }

    #[test]
    fn attribute_between_doc_and_header_is_stepped_over() {
        let (_dir, path) = write_temp("/// Old words\n#[inline]\nfn run() {}\n");
        adapter()
            .insert_doc_block(&path, 3, &["What:".to_string()])
            .unwrap();
        let updated = std::fs::read_to_string(&path).unwrap();
        assert_eq!(updated, "/// What:\n#[inline]\nfn run() {}\n");
    }

    #[test]
    fn fresh_doc_lands_above_attributes() {
        let (_dir, path) = write_temp("#[derive(Debug)]\nstruct Point;\n");
        adapter()
            .insert_doc_block(&path, 2, &["What:".to_string()])
            .unwrap();
        let updated = std::fs::read_to_string(&path).unwrap();
        assert_eq!(updated, "/// What:\n#[derive(Debug)]\nstruct Point;\n");
    }

    #[test]
    fn extract_sees_through_attributes() {
        let (_dir, path) = write_temp("/// Old words\n#[inline]\nfn run() {}\n");
        let raw = adapter().extract_doc_block(&path, 3).unwrap().unwrap();
        assert!(raw.contains("Old words"));
        assert!(!raw.contains("#[inline]"));
    }

    #[test]
    fn use_paths_are_normalized() {
        assert_eq!(RustAdapter::normalize_use("std::fs"), "std::fs");
        assert_eq!(RustAdapter::normalize_use("std::io::{Read, Write}"), "std::io");
        assert_eq!(RustAdapter::normalize_use("serde_json as json"), "serde_json");
        assert_eq!(RustAdapter::normalize_use("crate::util::*"), "crate::util");
    }

    #[test]
    fn metadata_sees_method_and_scoped_calls() {
        let (_dir, path) = write_temp(
            "use std::fs;\nuse std::io::{Read, Write};\n\nfn run(buf: &str) {\n    buf.trim();\n    fs::read(buf);\n    helper();\n}\n\nfn helper() {}\n",
        );
        let metadata = adapter().gather_metadata(&path, "run");
        assert_eq!(metadata.calls, vec!["helper", "read", "trim"]);
        assert_eq!(metadata.imports, vec!["std::fs", "std::io"]);
    }

    #[test]
    fn struct_and_trait_headers_are_declarations() {
        let adapter = adapter();
        let source = "struct Point {\n    x: i32,\n}\n\ntrait Shape {\n    fn area(&self) -> i32;\n}\n";
        let decls = adapter.list_declarations(source);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Point", "Shape", "area"]);
    }

    #[test]
    fn off_by_one_line_is_not_found() {
        let adapter = adapter();
        let source = "fn run() {}\n";
        assert!(matches!(
            adapter.locate_declaration(Path::new("lib.rs"), source, 2),
            Err(Error::DeclarationNotFound { .. })
        ));
    }
}
