//! Language identification and detection
//!
//! Maps file extensions to language IDs and provides language metadata.

use std::path::Path;

/// Supported language identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    JavaScript,
    TypeScript,
    Rust,
    Python,
}

impl LanguageId {
    /// Every language with a parser, in initialization order
    pub const PARSED: [LanguageId; 4] = [
        LanguageId::JavaScript,
        LanguageId::TypeScript,
        LanguageId::Rust,
        LanguageId::Python,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => LanguageId::JavaScript,
            "ts" | "mts" | "cts" => LanguageId::TypeScript,
            "rs" => LanguageId::Rust,
            "py" | "pyi" => LanguageId::Python,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "Plain Text",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::TypeScript => "TypeScript",
            LanguageId::Rust => "Rust",
            LanguageId::Python => "Python",
        }
    }

    /// Check if occurrences can be marked in this language
    pub fn supports_occurrences(&self) -> bool {
        !matches!(self, LanguageId::PlainText)
    }
}
