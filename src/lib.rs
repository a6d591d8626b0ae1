//! # Docweave - Documentation Mutation & Metadata Injection Engine
//!
//! Docweave mutates source files in place: given a declaration location it
//! inserts or replaces a structured documentation block (narrative prose plus
//! deterministically collected metadata) while guaranteeing the file remains
//! syntactically valid afterward.
//!
//! Docweave provides:
//! - Language adapters (Python, JavaScript, Rust, Go) over tree-sitter
//! - An adapter registry dispatching on file extension
//! - A compose-validate-commit mutation engine with atomic file replacement
//! - A deterministic metadata collector (call names, imports, git changelog)
//! - A document composer that refreshes metadata sections while preserving
//!   narrative prose verbatim

pub mod adapter;
pub mod compose;
pub mod config;
pub mod cst;
pub mod declaration;
pub mod docblock;
pub mod engine;
pub mod ignore;
pub mod metadata;
pub mod mutate;
pub mod narrative;

// Re-exports for convenient access
pub use adapter::{default_registry, AdapterRegistry, LanguageAdapter};
pub use declaration::{Declaration, DocSpan};
pub use docblock::{ChangelogEntry, CommentStyle, DocBlock, Metadata, Narrative};
pub use engine::Engine;
pub use mutate::{MutationReason, MutationResult};

/// Result type alias for Docweave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Docweave operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested line does not start a documentable declaration.
    /// Non-fatal: batch drivers skip and continue.
    #[error("no declaration found at {path}:{line}")]
    DeclarationNotFound { path: String, line: u32 },

    /// Composed content failed re-parsing. The original file is untouched.
    #[error("composed content is invalid near line {line}: {detail}")]
    SyntaxInvalid { line: u32, detail: String },

    /// A language grammar could not be initialized. Fatal at startup.
    #[error("parser unavailable: {0}")]
    ParseUnavailable(String),

    /// No registered adapter handles the file's extension.
    #[error("no language adapter for {path}")]
    Unsupported { path: String },

    /// The source file is not valid UTF-8; the mutation is aborted.
    #[error("{path} is not valid UTF-8")]
    Decode { path: String },

    #[error("narrative provider error: {0}")]
    Narrative(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is an expected per-declaration condition that a batch
    /// driver recovers from, as opposed to a fatal one.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DeclarationNotFound { .. } | Error::SyntaxInvalid { .. }
        )
    }
}
