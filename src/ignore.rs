//! Repository ignore filter
//!
//! Shared across all language adapters so discovery behaves the same way
//! regardless of language. Combines `.gitignore`/`.ignore` files with a
//! default noise list and config-supplied excludes.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: Option<&[String]>) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        builder.add(root.join(".gitignore"));
        builder.add(root.join(".ignore"));

        // Directories and artifacts never worth documenting
        let defaults = [
            "target/",
            "node_modules/",
            "venv/",
            ".venv/",
            "vendor/",
            "dist/",
            "build/",
            "__pycache__/",
            ".git/",
            ".hg/",
            ".svn/",
            ".idea/",
            ".vscode/",
            "*.min.js",
            "*.pyc",
            "*.pyo",
            "*.lock",
        ];

        for pattern in defaults {
            // Static patterns; add_line only fails on malformed globs
            builder.add_line(None, pattern).ok();
        }

        if let Some(excludes) = extra_excludes {
            for pattern in excludes {
                builder.add_line(None, pattern).ok();
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    /// A filter that excludes nothing, for callers operating on a single
    /// explicit file.
    pub fn permissive() -> Self {
        Self {
            inner: Gitignore::empty(),
        }
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}
