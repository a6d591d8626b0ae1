//! Go language adapter
//!
//! Doc blocks are `//` comment runs directly above the declaration header,
//! per the Go doc-comment convention.

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
    "function_declaration",
    "method_declaration",
    "type_declaration",
];

/// Compiler directives (`//go:noinline`, `//go:embed`, ...) belong to the
/// header, not the doc run: absorbing one into a doc block would silently
/// change program semantics.
fn compiler_directive(line: &str) -> bool {
    line.trim_start().starts_with("//go:")
}

pub struct GoAdapter {
    cst: TreeProvider,
}

impl GoAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cst: TreeProvider::new("Go", tree_sitter_go::LANGUAGE.into())?,
        })
    }

    fn name_of(node: Node<'_>, source: &str) -> Option<String> {
        if node.kind() == "type_declaration" {
            // The name lives on the inner type_spec.
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "type_spec" {
                    return child
                        .child_by_field_name("name")
                        .map(|n| treewalk::node_text(n, source).to_string());
                }
            }
            return None;
        }
        node.child_by_field_name("name")
            .map(|n| treewalk::node_text(n, source).to_string())
    }

    fn collect_imports(root: Node<'_>, source: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "import_declaration" {
                continue;
            }
            for spec in treewalk::collect_nodes(child, &["import_spec"]) {
                if let Some(path_node) = spec.child_by_field_name("path") {
                    let text = treewalk::node_text(path_node, source);
                    names.push(text.trim_matches('"').to_string());
                }
            }
        }
        crate::metadata::deterministic(names)
    }

    fn find_at_line<'t>(&self, root: Node<'t>, line: u32) -> Option<Node<'t>> {
        treewalk::find_declaration_at_line(root, line, DECL_KINDS)
    }
}

impl LanguageAdapter for GoAdapter {
    fn language_name(&self) -> &'static str {
        "Go"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["go"]
    }

    fn comment_style(&self) -> CommentStyle {
        CommentStyle::GO_LINE
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
            compiler_directive,
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
            compiler_directive,
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
            compiler_directive,
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
                &[("selector_expression", "field")],
            ),
            imports: Self::collect_imports(root, &source),
            changelog: Vec::new(),
        }
    }

    fn validate_syntax(&self, source: &str) -> Result<()> {
        self.cst.validate(source)
    }
}
