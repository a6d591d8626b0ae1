//! Shared tree-walking helpers
//!
//! The per-language adapters differ in node kinds and field names but share
//! the same traversal shapes: find a declaration by header line or by name,
//! collect call expressions under a subtree, and scan for an adjacent
//! comment block. Those shapes live here, parameterized by small tables.

use crate::declaration::{Declaration, DocSpan};
use crate::docblock::CommentStyle;
use crate::metadata;
use tree_sitter::Node;

/// How far extraction is willing to look for an adjacent doc block before
/// treating a comment as unrelated.
pub const ADJACENCY_WINDOW: usize = 50;

/// 1-based line of a node's start position.
pub fn node_line(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// 1-based line of a node's end position.
pub fn node_end_line(node: Node<'_>) -> u32 {
    node.end_position().row as u32 + 1
}

/// Node source text, empty on a byte-range mishap.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Collect nodes of the given kinds in depth-first pre-order.
pub fn collect_nodes<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    walk(root, kinds, &mut out);
    out
}

fn walk<'t>(node: Node<'t>, kinds: &[&str], out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            out.push(child);
        }
        walk(child, kinds, out);
    }
}

/// Find the declaration node whose header starts exactly at `line`.
///
/// Ambiguity between nested declarations sharing a line is resolved as the
/// first depth-first match; this mirrors the historical behavior and is a
/// documented simplification, not a tie-break to improve.
pub fn find_declaration_at_line<'t>(root: Node<'t>, line: u32, kinds: &[&str]) -> Option<Node<'t>> {
    collect_nodes(root, kinds)
        .into_iter()
        .find(|node| node_line(*node) == line)
}

/// Find the first declaration node (depth-first) with the given name.
pub fn find_declaration_by_name<'t>(
    root: Node<'t>,
    kinds: &[&str],
    target: &str,
    name_of: impl Fn(Node<'t>) -> Option<String>,
) -> Option<Node<'t>> {
    collect_nodes(root, kinds)
        .into_iter()
        .find(|node| name_of(*node).as_deref() == Some(target))
}

/// Build a `Declaration` from a located node.
pub fn declaration_from_node(node: Node<'_>, source: &str, name: String) -> Declaration {
    let start_line = node_line(node);
    let indent = source
        .lines()
        .nth(start_line as usize - 1)
        .map(|line| {
            let trimmed = line.trim_start();
            line[..line.len() - trimmed.len()].to_string()
        })
        .unwrap_or_default();
    Declaration::new(name, start_line, node_end_line(node), indent)
}

/// Collect callee names under `scope`.
///
/// Each call expression's callee resolves through a direct identifier or the
/// final member-access segment: `a.b()` records `b`, never the qualified
/// chain. Output is sorted and deduplicated.
pub fn collect_calls(
    scope: Node<'_>,
    source: &str,
    call_kinds: &[&str],
    callee_field: &str,
    member_fields: &[(&str, &str)],
) -> Vec<String> {
    let mut names = Vec::new();
    for call in collect_nodes(scope, call_kinds) {
        if let Some(callee) = call.child_by_field_name(callee_field) {
            let name = resolve_callee(callee, source, member_fields);
            if !name.is_empty() {
                names.push(name);
            }
        }
    }
    metadata::deterministic(names)
}

fn resolve_callee(callee: Node<'_>, source: &str, member_fields: &[(&str, &str)]) -> String {
    for (kind, field) in member_fields {
        if callee.kind() == *kind {
            if let Some(segment) = callee.child_by_field_name(field) {
                return node_text(segment, source).to_string();
            }
        }
    }
    let text = node_text(callee, source);
    // Fall back to the terminal segment of a dotted chain
    text.rsplit('.').next().unwrap_or(text).trim().to_string()
}

/// First line of the run of header-attached lines (Rust attributes, Go
/// compiler directives) directly above `decl_idx`; `decl_idx` itself when
/// there are none. Attached lines belong to the header: the doc-block scan
/// steps over them and a fresh block is inserted above them.
pub fn attachment_start(lines: &[&str], decl_idx: usize, attached: fn(&str) -> bool) -> usize {
    let mut idx = decl_idx;
    while idx > 0 && attached(lines[idx - 1]) {
        idx -= 1;
    }
    idx
}

/// Locate the comment block immediately above `decl_idx` (0-based line
/// index), bounded by `window` lines. Header-attached lines directly under
/// the scan are stepped over, never absorbed. A malformed block, such as an
/// unterminated delimiter pair, is reported as absent rather than as a
/// partial match.
pub fn comment_span_above(
    lines: &[&str],
    decl_idx: usize,
    style: &CommentStyle,
    window: usize,
    attached: fn(&str) -> bool,
) -> Option<DocSpan> {
    let anchor = attachment_start(lines, decl_idx, attached);
    if anchor == 0 {
        return None;
    }
    match style {
        CommentStyle::Line { prefix } => {
            let token = prefix.trim_end();
            let mut start = anchor;
            while start > 0
                && anchor - start < window
                && lines[start - 1].trim_start().starts_with(token)
                && !attached(lines[start - 1])
            {
                start -= 1;
            }
            (start < anchor).then(|| DocSpan::new(start, anchor))
        }
        CommentStyle::Block { open, close, .. } => {
            let last = lines[anchor - 1].trim();
            if !last.ends_with(close.trim()) {
                return None;
            }
            let lowest = anchor.saturating_sub(window);
            for start in (lowest..anchor).rev() {
                let candidate = lines[start].trim_start();
                if candidate.starts_with(open) {
                    return Some(DocSpan::new(start, anchor));
                }
                // A closing delimiter above the last line means we walked
                // into an unrelated block.
                if start < anchor - 1 && candidate.trim_end().ends_with(close.trim()) {
                    return None;
                }
            }
            None
        }
        // Docstring placement is inside the body, handled per language.
        CommentStyle::DocString { .. } => None,
    }
}

/// Raw text of the comment block above a declaration node, for languages
/// that place docs before the header. `None` when absent or malformed.
pub fn extract_above(
    source: &str,
    node: Node<'_>,
    style: &CommentStyle,
    attached: fn(&str) -> bool,
) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let idx = node.start_position().row;
    let span = comment_span_above(&lines, idx, style, ADJACENCY_WINDOW, attached)?;
    // A span the style itself cannot decode is treated as no block at all.
    style.strip(&lines[span.start..span.end])?;
    Some(lines[span.start..span.end].join("\n"))
}

/// Compose new file content with `body` rendered above the declaration,
/// replacing an existing adjacent block when one exists. A fresh block goes
/// above any header-attached lines. The span is computed once and spliced
/// once.
pub fn splice_above(
    source: &str,
    node: Node<'_>,
    style: &CommentStyle,
    body: &[String],
    indent: &str,
    attached: fn(&str) -> bool,
) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let idx = node.start_position().row;
    let span = comment_span_above(&lines, idx, style, ADJACENCY_WINDOW, attached)
        .unwrap_or_else(|| DocSpan::insertion_at(attachment_start(&lines, idx, attached)));
    let rendered = style.render(body, indent);
    crate::mutate::splice_lines(
        &lines,
        span,
        &rendered,
        source.ends_with('\n'),
        crate::mutate::line_ending(source),
    )
}
