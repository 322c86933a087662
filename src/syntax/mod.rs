//! Syntax front-end
//!
//! Provides tree-sitter based parsing and the structural facts symbol
//! resolution needs:
//! - Language detection from file extensions
//! - Incremental parsing into immutable [`ParsedFile`] snapshots
//! - Per-language grammar tables (identifiers, scopes, declarations)
//! - Lexical scope indexing
//! - Offset mapping between a snapshot and the live document
//!
//! ## Supported Languages
//!
//! - JavaScript
//! - TypeScript
//! - Rust
//! - Python

mod grammar;
mod languages;
mod mapping;
mod parsed_file;
mod parser;
mod scopes;

pub use grammar::{
    field_name_of, grammar, DeclarationRule, Grammar, Namespace, Rebinding, Reclassification,
    Visibility,
};
pub use languages::LanguageId;
pub use mapping::SnapshotMapping;
pub use parsed_file::ParsedFile;
pub use parser::{language_for, ParserState};
pub use scopes::{Declaration, ScopeId, ScopeIndex};
