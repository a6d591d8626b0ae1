//! Core adapter framework
//!
//! Defines the capability set every language adapter implements and the
//! registry that dispatches on file extension. The registry is populated
//! once at startup and treated as read-only afterwards; introspection
//! methods hand out defensive copies so callers cannot corrupt it.

use crate::declaration::Declaration;
use crate::docblock::{CommentStyle, Metadata};
use crate::ignore::IgnoreFilter;
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Trait for language adapters
///
/// Each adapter normalizes one language family's concrete-syntax-tree shape
/// behind a fixed capability set:
/// 1. Discovering files it can handle
/// 2. Extracting and inserting doc blocks for a declaration at a line
/// 3. Gathering call/import metadata for a named declaration
/// 4. Validating that source text still parses cleanly
///
/// The per-declaration operations are failure-tolerant: ordinary "not found"
/// conditions come back as `None`/empty rather than errors, while
/// configuration problems (an unloadable grammar) fail loudly at
/// construction time.
pub trait LanguageAdapter: Send + Sync {
    /// Language name for display
    fn language_name(&self) -> &'static str;

    /// File extensions this adapter handles (lowercase, without the dot)
    fn file_extensions(&self) -> &[&'static str];

    /// The language's native doc comment convention
    fn comment_style(&self) -> CommentStyle;

    /// Check if this adapter can handle a file (case-insensitive)
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.file_extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Enumerate the files this adapter should process under `target`.
    ///
    /// A single file maps to itself (or nothing, if unsupported). A
    /// directory is walked recursively with version-control metadata
    /// directories excluded by path component and the shared ignore filter
    /// applied uniformly. Results are sorted for deterministic batch order.
    fn discover_files(&self, target: &Path, filter: &IgnoreFilter) -> Vec<PathBuf> {
        if target.is_file() {
            return if self.can_handle(target) {
                vec![target.to_path_buf()]
            } else {
                Vec::new()
            };
        }

        let mut found: Vec<PathBuf> = WalkDir::new(target)
            .into_iter()
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_dir();
                !is_vcs_component(entry.file_name()) && !filter.is_ignored(entry.path(), is_dir)
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.can_handle(path))
            .collect();
        found.sort();
        found
    }

    /// Find the declaration whose header starts exactly at `line` (1-based).
    /// First depth-first match wins when declarations share a line.
    fn locate_declaration(&self, path: &Path, source: &str, line: u32) -> Result<Declaration>;

    /// All documentable declarations in `source`, in depth-first order.
    fn list_declarations(&self, source: &str) -> Vec<Declaration>;

    /// Raw text of a pre-existing doc block adjacent to the declaration at
    /// `line`, or `None` when there is no declaration or no block.
    fn extract_doc_block(&self, path: &Path, line: u32) -> Result<Option<String>>;

    /// Insert or replace the doc block for the declaration at `line` with
    /// `body` (language-neutral lines), writing only through the safe
    /// mutation engine.
    fn insert_doc_block(&self, path: &Path, line: u32, body: &[String]) -> Result<()>;

    /// Calls and imports for the first declaration named
    /// `declaration_name`. Empty, never an error, if the tree cannot be
    /// produced.
    fn gather_metadata(&self, path: &Path, declaration_name: &str) -> Metadata;

    /// Re-parse `source`; `Ok` iff the tree has no error/missing nodes.
    fn validate_syntax(&self, source: &str) -> Result<()>;
}

fn is_vcs_component(name: &std::ffi::OsStr) -> bool {
    matches!(name.to_str(), Some(".git" | ".hg" | ".svn"))
}

/// Registry of language adapters keyed by file extension.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    by_extension: HashMap<String, Arc<dyn LanguageAdapter>>,
    adapters: Vec<Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under every extension it supports, normalized to
    /// lowercase. Collisions overwrite silently; callers control load order.
    pub fn register(&mut self, adapter: Arc<dyn LanguageAdapter>) {
        self.adapters
            .retain(|existing| existing.language_name() != adapter.language_name());
        for ext in adapter.file_extensions() {
            self.by_extension
                .insert(ext.to_lowercase(), Arc::clone(&adapter));
        }
        self.adapters.push(adapter);
    }

    /// Case-insensitive extension lookup.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn LanguageAdapter>> {
        self.by_extension.get(&ext.to_lowercase()).cloned()
    }

    pub fn get_by_path(&self, path: &Path) -> Option<Arc<dyn LanguageAdapter>> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    /// All supported extensions, sorted. A defensive copy.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.by_extension.keys().cloned().collect();
        extensions.sort();
        extensions
    }

    /// All registered adapters, in registration order. A defensive copy.
    pub fn list_adapters(&self) -> Vec<Arc<dyn LanguageAdapter>> {
        self.adapters.clone()
    }
}

/// Create a registry with all built-in adapters.
///
/// Fails fast with `ParseUnavailable` if any grammar cannot be initialized:
/// that is a configuration error, not a runtime condition.
pub fn default_registry() -> Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(super::python::PythonAdapter::new()?));
    registry.register(Arc::new(super::javascript::JavaScriptAdapter::new()?));
    registry.register(Arc::new(super::rust_lang::RustAdapter::new()?));
    registry.register(Arc::new(super::go::GoAdapter::new()?));
    Ok(registry)
}
