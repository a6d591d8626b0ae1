//! Safe mutation engine
//!
//! The single choke point for all file modification. Each mutation moves
//! through `Composed -> Validated -> Committed`; a failure in the first two
//! states aborts with the original file untouched. The commit writes to a
//! temporary file in the same directory and atomically renames it over the
//! original, so no partial write is ever visible to a concurrent reader.

use crate::declaration::DocSpan;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Why a mutation ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationReason {
    Committed,
    DeclarationNotFound,
    SyntaxInvalid,
}

/// Outcome of one mutation: either the file was fully replaced with
/// validated content, or it was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    pub success: bool,
    pub reason: MutationReason,
}

impl MutationResult {
    pub fn committed() -> Self {
        Self {
            success: true,
            reason: MutationReason::Committed,
        }
    }

    pub fn skipped(reason: MutationReason) -> Self {
        Self {
            success: false,
            reason,
        }
    }
}

/// A mutation in the `Composed` state: the complete new file content exists
/// in memory and the real file has not been touched.
#[derive(Debug)]
pub struct ComposedMutation {
    path: PathBuf,
    content: String,
}

/// A mutation whose content passed syntax validation. The only way to
/// construct one is through [`ComposedMutation::validate`], so a commit
/// of unvalidated content is unrepresentable.
#[derive(Debug)]
pub struct ValidatedMutation {
    path: PathBuf,
    content: String,
}

impl ComposedMutation {
    pub fn new(path: &Path, content: String) -> Self {
        Self {
            path: path.to_path_buf(),
            content,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check the composed content with the adapter's syntax validator,
    /// transitioning to `Validated` on success. On failure the mutation is
    /// dropped and the original file stays intact.
    pub fn validate(self, check: impl Fn(&str) -> Result<()>) -> Result<ValidatedMutation> {
        check(&self.content)?;
        Ok(ValidatedMutation {
            path: self.path,
            content: self.content,
        })
    }
}

impl ValidatedMutation {
    /// Write the content to a temp file next to the target and atomically
    /// rename it over the original. Any I/O failure before the rename leaves
    /// the original untouched.
    pub fn commit(self) -> Result<()> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(parent) => NamedTempFile::new_in(parent)?,
            None => NamedTempFile::new()?,
        };
        use std::io::Write as _;
        tmp.write_all(self.content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// Rebuild file content with `span` replaced by `replacement`. The span is
/// computed once and spliced once per mutation, which excludes the classic
/// duplicate-insertion defect of two-pass designs by construction.
pub fn splice_lines(
    lines: &[&str],
    span: DocSpan,
    replacement: &[String],
    trailing_newline: bool,
    eol: &str,
) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + replacement.len());
    let start = span.start.min(lines.len());
    let end = span.end.clamp(start, lines.len());
    out.extend_from_slice(&lines[..start]);
    out.extend(replacement.iter().map(String::as_str));
    out.extend_from_slice(&lines[end..]);
    let mut content = out.join(eol);
    if trailing_newline {
        content.push_str(eol);
    }
    content
}

/// The dominant line ending of `source`. A mutation rejoins lines with this
/// ending so a CRLF file stays CRLF; mixed files resolve to the majority.
pub fn line_ending(source: &str) -> &'static str {
    let crlf = source.matches("\r\n").count();
    let lf = source.matches('\n').count() - crlf;
    if crlf > lf {
        "\r\n"
    } else {
        "\n"
    }
}

/// Read a source file as strict UTF-8. A decode failure aborts the mutation
/// rather than silently re-encoding the file.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| Error::Decode {
        path: path.display().to_string(),
    })
}
