//! Python language adapter
//!
//! Python doc blocks are docstrings: a string expression as the first
//! statement of the declaration body, indented to the body's level. All
//! other adapters place comments above the header; this one is the odd one
//! out and owns its own placement logic.

use super::framework::LanguageAdapter;
use super::treewalk::{self, ADJACENCY_WINDOW};
use crate::cst::TreeProvider;
use crate::declaration::{Declaration, DocSpan};
use crate::docblock::{CommentStyle, Metadata};
use crate::mutate::{line_ending, read_source, splice_lines, ComposedMutation};
use crate::{Error, Result};
use std::path::Path;
use tree_sitter::Node;

const DECL_KINDS: &[&str] = &["function_definition", "class_definition"];
const BODY_INDENT: &str = "    ";

pub struct PythonAdapter {
    cst: TreeProvider,
}

impl PythonAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cst: TreeProvider::new("Python", tree_sitter_python::LANGUAGE.into())?,
        })
    }

    fn name_of(node: Node<'_>, source: &str) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| treewalk::node_text(n, source).to_string())
    }

    /// The docstring statement of a declaration body, if the first statement
    /// is a string expression.
    fn docstring_node<'t>(decl: Node<'t>) -> Option<Node<'t>> {
        let body = decl.child_by_field_name("body")?;
        let first = body.named_child(0)?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let expr = first.named_child(0)?;
        (expr.kind() == "string").then_some(first)
    }

    /// Where the doc block lives or belongs: the existing docstring span to
    /// replace, or an insertion point after the header, plus the indent to
    /// render at.
    fn doc_placement(decl: Node<'_>, source: &str) -> (Option<DocSpan>, DocSpan, String) {
        let header_row = decl.start_position().row;
        if let Some(docstring) = Self::docstring_node(decl) {
            let start = docstring.start_position().row;
            let end = docstring.end_position().row + 1;
            if start.saturating_sub(header_row) <= ADJACENCY_WINDOW {
                let span = DocSpan::new(start, end);
                let indent = indent_of_line(source, start);
                return (Some(span), span, indent);
            }
        }
        match decl.child_by_field_name("body") {
            Some(body) if body.start_position().row > header_row => {
                let row = body.start_position().row;
                (
                    None,
                    DocSpan::insertion_at(row),
                    indent_of_line(source, row),
                )
            }
            // Stub or one-line declaration: insert right after the header
            // and let validation veto anything the grammar rejects.
            _ => {
                let indent = format!("{}{}", indent_of_line(source, header_row), BODY_INDENT);
                (None, DocSpan::insertion_at(header_row + 1), indent)
            }
        }
    }

    fn collect_imports(root: Node<'_>, source: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    let mut inner = child.walk();
                    for item in child.named_children(&mut inner) {
                        match item.kind() {
                            "dotted_name" => {
                                names.push(treewalk::node_text(item, source).to_string());
                            }
                            "aliased_import" => {
                                if let Some(name) = item.child_by_field_name("name") {
                                    names.push(treewalk::node_text(name, source).to_string());
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "import_from_statement" => {
                    if let Some(module) = child.child_by_field_name("module_name") {
                        names.push(treewalk::node_text(module, source).to_string());
                    }
                }
                _ => {}
            }
        }
        crate::metadata::deterministic(names)
    }
}

fn indent_of_line(source: &str, row: usize) -> String {
    source
        .lines()
        .nth(row)
        .map(|line| {
            let trimmed = line.trim_start();
            line[..line.len() - trimmed.len()].to_string()
        })
        .unwrap_or_default()
}

impl LanguageAdapter for PythonAdapter {
    fn language_name(&self) -> &'static str {
        "Python"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["py", "pyi"]
    }

    fn comment_style(&self) -> CommentStyle {
        CommentStyle::PYTHON_DOCSTRING
    }

    fn locate_declaration(&self, path: &Path, source: &str, line: u32) -> Result<Declaration> {
        let tree = self.cst.parse(source)?;
        let node = treewalk::find_declaration_at_line(tree.root_node(), line, DECL_KINDS)
            .ok_or_else(|| Error::DeclarationNotFound {
                path: path.display().to_string(),
                line,
            })?;
        let name = Self::name_of(node, source).unwrap_or_default();
        let mut decl = treewalk::declaration_from_node(node, source, name);
        let (existing, _, _) = Self::doc_placement(node, source);
        if let Some(span) = existing {
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
        let Some(node) = treewalk::find_declaration_at_line(tree.root_node(), line, DECL_KINDS)
        else {
            return Ok(None);
        };
        let (existing, _, _) = Self::doc_placement(node, &source);
        let Some(span) = existing else {
            return Ok(None);
        };
        let lines: Vec<&str> = source.lines().collect();
        Ok(Some(lines[span.start..span.end].join("\n")))
    }

    fn insert_doc_block(&self, path: &Path, line: u32, body: &[String]) -> Result<()> {
        let source = read_source(path)?;
        let tree = self.cst.parse(&source)?;
        let node = treewalk::find_declaration_at_line(tree.root_node(), line, DECL_KINDS)
            .ok_or_else(|| Error::DeclarationNotFound {
                path: path.display().to_string(),
                line,
            })?;
        let (_, span, indent) = Self::doc_placement(node, &source);
        let rendered = self.comment_style().render(body, &indent);
        let lines: Vec<&str> = source.lines().collect();
        let content = splice_lines(
            &lines,
            span,
            &rendered,
            source.ends_with('\n'),
            line_ending(&source),
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
        let Some(decl) = treewalk::find_declaration_by_name(root, DECL_KINDS, declaration_name, |n| {
            Self::name_of(n, &source)
        }) else {
            return Metadata::default();
        };
        Metadata {
            calls: treewalk::collect_calls(
                decl,
                &source,
                &["call"],
                "function",
                &[("attribute", "attribute")],
            ),
            imports: Self::collect_imports(root, &source),
            changelog: Vec::new(),
        }
    }

    fn validate_syntax(&self, source: &str) -> Result<()> {
        self.cst.validate(source)
    }
}
