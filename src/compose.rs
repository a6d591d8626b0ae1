//! Document composer
//!
//! Splices freshly computed metadata into an existing doc block body while
//! preserving narrative prose byte-for-byte. Section boundaries are found by
//! a small hand-written line scanner over a fixed token stream (`What:`,
//! `Why:`, `Guardrails:`, `Metadata:`) instead of ad hoc pattern matching,
//! so boundary detection stays exhaustively testable.

use crate::docblock::Metadata;

/// The recognized section headers of a doc block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    What,
    Why,
    Guardrails,
    Metadata,
}

impl SectionKind {
    pub fn header(self) -> &'static str {
        match self {
            SectionKind::What => "What:",
            SectionKind::Why => "Why:",
            SectionKind::Guardrails => "Guardrails:",
            SectionKind::Metadata => "Metadata:",
        }
    }

    fn from_line(line: &str) -> Option<Self> {
        match line.trim() {
            "What:" => Some(SectionKind::What),
            "Why:" => Some(SectionKind::Why),
            "Guardrails:" => Some(SectionKind::Guardrails),
            "Metadata:" => Some(SectionKind::Metadata),
            _ => None,
        }
    }
}

/// One scanned line of a doc block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineToken {
    Header(SectionKind),
    Text,
}

/// A section located in the body: its header line index and the half-open
/// range of body lines that belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub header: usize,
    pub body_start: usize,
    pub body_end: usize,
}

/// Tokenize body lines. A line is a header only when its trimmed form equals
/// one of the four recognized headers exactly.
pub fn tokenize(lines: &[String]) -> Vec<LineToken> {
    lines
        .iter()
        .map(|line| match SectionKind::from_line(line) {
            Some(kind) => LineToken::Header(kind),
            None => LineToken::Text,
        })
        .collect()
}

/// Scan the body into sections. A section runs from its header to the next
/// header or end of body. Lines before the first header belong to no section
/// and are always preserved.
pub fn scan_sections(lines: &[String]) -> Vec<Section> {
    let tokens = tokenize(lines);
    let mut sections: Vec<Section> = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        match token {
            LineToken::Header(kind) => {
                if let Some(open) = sections.last_mut() {
                    open.body_end = idx;
                }
                sections.push(Section {
                    kind: *kind,
                    header: idx,
                    body_start: idx + 1,
                    body_end: lines.len(),
                });
            }
            LineToken::Text => {}
        }
    }
    sections
}

/// Replace the metadata section of `lines` with a render of `metadata`,
/// appending one at the end when no metadata section exists yet. Narrative
/// sections are located but never rewritten; the replacement is a full
/// recompute, never a merge with the old section.
pub fn inject_metadata(lines: &[String], metadata: &Metadata) -> Vec<String> {
    let sections = scan_sections(lines);
    let rendered = metadata.to_lines();

    match sections.iter().find(|s| s.kind == SectionKind::Metadata) {
        Some(section) => {
            let mut out = Vec::with_capacity(lines.len() + rendered.len());
            out.extend_from_slice(&lines[..section.header]);
            out.extend(rendered);
            out.extend_from_slice(&lines[section.body_end..]);
            out
        }
        None => {
            let mut out = lines.to_vec();
            out.extend(rendered);
            out
        }
    }
}
