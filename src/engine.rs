//! Top-level driver
//!
//! Wires the pipeline together: registry dispatch, declaration lookup,
//! metadata collection, composition, and the safe mutation. The compose-once
//! contract lives here: the doc block body is fully assembled (narrative plus
//! metadata) before the single insertion call is made.

use crate::adapter::{default_registry, AdapterRegistry, LanguageAdapter};
use crate::compose;
use crate::declaration::Declaration;
use crate::docblock::{DocBlock, Metadata};
use crate::metadata::{collect_changelog, DEFAULT_MAX_REVISIONS};
use crate::mutate::{read_source, MutationReason, MutationResult};
use crate::narrative::NarrativeProvider;
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Accounting for one batch run over a file or directory.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct BatchSummary {
    pub documented: usize,
    pub skipped: usize,
}

impl BatchSummary {
    fn absorb(&mut self, result: &MutationResult) {
        if result.success {
            self.documented += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// The documentation engine: an adapter registry plus collection settings.
///
/// The registry is populated once at startup and read-only afterwards;
/// tests construct engines around their own registries.
pub struct Engine {
    registry: AdapterRegistry,
    max_revisions: usize,
}

impl Engine {
    pub fn new(registry: AdapterRegistry, max_revisions: usize) -> Self {
        Self {
            registry,
            max_revisions,
        }
    }

    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(default_registry()?, DEFAULT_MAX_REVISIONS))
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    fn adapter_for(&self, path: &Path) -> Result<Arc<dyn LanguageAdapter>> {
        self.registry
            .get_by_path(path)
            .ok_or_else(|| Error::Unsupported {
                path: path.display().to_string(),
            })
    }

    /// Document the declaration at `path:line`.
    ///
    /// An existing block keeps its narrative verbatim and has only its
    /// metadata section recomputed; a missing block gets fresh narrative
    /// from the provider. Expected conditions (`DeclarationNotFound`,
    /// `SyntaxInvalid`) come back as an unsuccessful result rather than an
    /// error, so batch drivers can keep going.
    pub fn document(
        &self,
        path: &Path,
        line: u32,
        provider: &dyn NarrativeProvider,
    ) -> Result<MutationResult> {
        match self.try_document(path, line, provider) {
            Ok(()) => Ok(MutationResult::committed()),
            Err(Error::DeclarationNotFound { path, line }) => {
                tracing::warn!("skipping {path}:{line}: no declaration there");
                Ok(MutationResult::skipped(MutationReason::DeclarationNotFound))
            }
            Err(Error::SyntaxInvalid { line, detail }) => {
                tracing::warn!("skipping mutation: composed content invalid near line {line}: {detail}");
                Ok(MutationResult::skipped(MutationReason::SyntaxInvalid))
            }
            Err(other) => Err(other),
        }
    }

    fn try_document(
        &self,
        path: &Path,
        line: u32,
        provider: &dyn NarrativeProvider,
    ) -> Result<()> {
        let adapter = self.adapter_for(path)?;
        let source = read_source(path)?;
        let decl = adapter.locate_declaration(path, &source, line)?;

        let mut metadata = adapter.gather_metadata(path, &decl.name);
        metadata.changelog =
            collect_changelog(path, decl.start_line, decl.end_line, self.max_revisions);

        let body = match adapter.extract_doc_block(path, line)? {
            Some(raw) => {
                let raw_lines: Vec<&str> = raw.lines().collect();
                match adapter.comment_style().strip(&raw_lines) {
                    Some(existing) => compose::inject_metadata(&existing, &metadata),
                    // Undecodable block: treat as absent and start over.
                    None => self.fresh_body(&decl, &source, provider, metadata)?,
                }
            }
            None => self.fresh_body(&decl, &source, provider, metadata)?,
        };

        adapter.insert_doc_block(path, line, &body)
    }

    fn fresh_body(
        &self,
        decl: &Declaration,
        source: &str,
        provider: &dyn NarrativeProvider,
        metadata: Metadata,
    ) -> Result<Vec<String>> {
        // The provider sees the declaration snippet and nothing else;
        // collected metadata never crosses this boundary.
        let narrative = provider.narrate(&decl.name, &decl.snippet(source))?;
        Ok(DocBlock::new(narrative).with_metadata(metadata).to_lines())
    }

    /// Raw text of the existing doc block at `path:line`, if any.
    pub fn inspect(&self, path: &Path, line: u32) -> Result<Option<String>> {
        let adapter = self.adapter_for(path)?;
        adapter.extract_doc_block(path, line)
    }

    /// Deterministic metadata for the named declaration, changelog included.
    pub fn metadata(&self, path: &Path, declaration_name: &str) -> Result<Metadata> {
        let adapter = self.adapter_for(path)?;
        let source = read_source(path)?;
        let mut metadata = adapter.gather_metadata(path, declaration_name);
        let range = adapter
            .list_declarations(&source)
            .into_iter()
            .find(|d| d.name == declaration_name)
            .map(|d| (d.start_line, d.end_line));
        metadata.changelog = match range {
            Some((start, end)) => collect_changelog(path, start, end, self.max_revisions),
            None => Vec::new(),
        };
        Ok(metadata)
    }

    /// Document every declaration in one file.
    ///
    /// Declarations are processed bottom-up so earlier insertions cannot
    /// shift the header lines still to be visited; every step re-reads the
    /// file and recomputes its span fresh. A missing narrative entry skips
    /// that declaration and the run continues.
    pub fn document_file(
        &self,
        path: &Path,
        provider: &dyn NarrativeProvider,
    ) -> Result<BatchSummary> {
        let adapter = self.adapter_for(path)?;
        let source = read_source(path)?;
        let mut decls = adapter.list_declarations(&source);
        decls.sort_by(|a, b| b.start_line.cmp(&a.start_line));

        let mut summary = BatchSummary::default();
        for decl in decls {
            match self.document(path, decl.start_line, provider) {
                Ok(result) => summary.absorb(&result),
                Err(Error::Narrative(reason)) => {
                    tracing::warn!(
                        "skipping {}:{} ({}): {reason}",
                        path.display(),
                        decl.start_line,
                        decl.name
                    );
                    summary.skipped += 1;
                }
                Err(other) => return Err(other),
            }
        }
        Ok(summary)
    }
}
