//! JavaScript language adapter
//!
//! Doc blocks are JSDoc-style `/** ... */` comments placed directly above
//! the declaration header, indented to the header's level.

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
    "generator_function_declaration",
    "class_declaration",
    "method_definition",
];

pub struct JavaScriptAdapter {
    cst: TreeProvider,
}

impl JavaScriptAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cst: TreeProvider::new("JavaScript", tree_sitter_javascript::LANGUAGE.into())?,
        })
    }

    fn name_of(node: Node<'_>, source: &str) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| treewalk::node_text(n, source).to_string())
    }

    fn collect_imports(root: Node<'_>, source: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "import_statement" {
                continue;
            }
            if let Some(module) = child.child_by_field_name("source") {
                let text = treewalk::node_text(module, source);
                names.push(text.trim_matches(|c| c == '"' || c == '\'').to_string());
            }
        }
        crate::metadata::deterministic(names)
    }

    fn find_at_line<'t>(&self, root: Node<'t>, line: u32) -> Option<Node<'t>> {
        treewalk::find_declaration_at_line(root, line, DECL_KINDS)
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language_name(&self) -> &'static str {
        "JavaScript"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn comment_style(&self) -> CommentStyle {
        CommentStyle::JS_BLOCK
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
            |_| false,
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
            |_| false,
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
        let content =
            treewalk::splice_above(&source, node, &self.comment_style(), body, &indent, |_| false);
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
                &[("member_expression", "property")],
            ),
            imports: Self::collect_imports(root, &source),
            changelog: Vec::new(),
        }
    }

    fn validate_syntax(&self, source: &str) -> Result<()> {
        self.cst.validate(source)
    }
}
