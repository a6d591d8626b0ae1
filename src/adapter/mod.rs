//! Language adapter framework
//!
//! Each language family implements the fixed capability set (discovery,
//! doc-block extraction and insertion, metadata gathering, syntax
//! validation) on top of its tree-sitter grammar. The registry is the
//! single dispatch point used by every higher-level operation.

pub mod framework;
pub mod go;
pub mod javascript;
pub mod python;
pub mod rust_lang;
pub mod treewalk;

pub use framework::{default_registry, AdapterRegistry, LanguageAdapter};
pub use go::GoAdapter;
pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;
pub use rust_lang::RustAdapter;
