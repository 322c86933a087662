//! Shared helpers for benchmarks

use std::sync::Arc;

use mark_occurrences::model::{Document, DocumentId};
use mark_occurrences::syntax::{LanguageId, ParsedFile, ParserState};

/// JavaScript source with `functions` functions sharing one counter
#[allow(dead_code)]
pub fn generate_javascript(functions: usize) -> String {
    let mut source = String::from("let counter = 0;\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "function step{i}(value) {{\n    const local = value * {i};\n    counter += local;\n    return counter;\n}}\n\n"
        ));
    }
    source
}

/// Parsed snapshot and matching live document
#[allow(dead_code)]
pub fn open(source: &str, language: LanguageId) -> (Arc<ParsedFile>, Document) {
    let parsed = ParserState::new()
        .parse(DocumentId(1), source, language, 1)
        .expect("benchmark source parses");
    let document = Document::with_text(source).with_language(language);
    (parsed, document)
}
