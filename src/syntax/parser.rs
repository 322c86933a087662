//! Tree-sitter parser state
//!
//! Manages one parser per language and caches the last tree per document so
//! re-parses after an edit are incremental.

use std::collections::HashMap;
use std::sync::Arc;

use tree_sitter::{InputEdit, Language, Parser, Point, Tree};

use super::languages::LanguageId;
use super::parsed_file::ParsedFile;
use crate::model::{Document, DocumentId};

/// Cached parse state for a document (enables incremental parsing)
struct DocParseState {
    /// The language this tree was parsed with
    language: LanguageId,
    /// The parsed tree
    tree: Tree,
    /// The source text that was parsed (needed for computing edits)
    source: String,
}

/// Convert a byte offset to a tree-sitter Point (row, column in bytes)
fn byte_to_point(text: &str, byte_offset: usize) -> Point {
    let mut row = 0usize;
    let mut col = 0usize;
    let bytes = text.as_bytes();

    for &byte in bytes.iter().take(byte_offset) {
        if byte == b'\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    Point { row, column: col }
}

/// Compute an InputEdit by diffing old and new source text.
/// Returns None if the sources are identical.
pub(crate) fn compute_incremental_edit(old_src: &str, new_src: &str) -> Option<InputEdit> {
    if old_src == new_src {
        return None;
    }

    let old_bytes = old_src.as_bytes();
    let new_bytes = new_src.as_bytes();

    // Find common prefix length (in bytes)
    let mut start = 0;
    let max_start = old_bytes.len().min(new_bytes.len());
    while start < max_start && old_bytes[start] == new_bytes[start] {
        start += 1;
    }

    // Find common suffix length (in bytes), not overlapping prefix
    let mut old_end = old_bytes.len();
    let mut new_end = new_bytes.len();
    while old_end > start && new_end > start && old_bytes[old_end - 1] == new_bytes[new_end - 1] {
        old_end -= 1;
        new_end -= 1;
    }

    // The edit is: old_src[start..old_end] replaced by new_src[start..new_end]
    let start_position = byte_to_point(old_src, start);
    let old_end_position = byte_to_point(old_src, old_end);
    let new_end_position = byte_to_point(new_src, new_end);

    Some(InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position,
        old_end_position,
        new_end_position,
    })
}

/// Tree-sitter language for a language id, `None` for plain text
pub fn language_for(lang: LanguageId) -> Option<Language> {
    match lang {
        LanguageId::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        LanguageId::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        LanguageId::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
        LanguageId::Python => Some(tree_sitter_python::LANGUAGE.into()),
        LanguageId::PlainText => None,
    }
}

/// Parser state owned by the editor thread (tree-sitter parsers are !Sync)
pub struct ParserState {
    /// Parser instances per language
    parsers: HashMap<LanguageId, Parser>,
    /// Cached parse state per document (for incremental parsing)
    doc_cache: HashMap<DocumentId, DocParseState>,
}

impl ParserState {
    /// Create a new parser state with every supported language initialized
    pub fn new() -> Self {
        let mut state = Self {
            parsers: HashMap::new(),
            doc_cache: HashMap::new(),
        };

        for lang in LanguageId::PARSED {
            state.init_language(lang);
        }

        state
    }

    fn init_language(&mut self, lang: LanguageId) {
        let Some(ts_lang) = language_for(lang) else {
            return;
        };

        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&ts_lang) {
            tracing::error!("Failed to set language for {:?}: {}", lang, e);
            return;
        }
        self.parsers.insert(lang, parser);
    }

    /// Parse the current text of a document, keeping its path on the snapshot
    pub fn parse_document(&mut self, document: &Document) -> Option<Arc<ParsedFile>> {
        let doc_id = document.id.unwrap_or_default();
        let source = document.text();
        let parsed = self.parse_snapshot(doc_id, &source, document.language, document.revision)?;
        Some(Arc::new(match &document.file_path {
            Some(path) => parsed.with_path(path.clone()),
            None => parsed,
        }))
    }

    /// Parse a document snapshot.
    /// Uses incremental parsing when a cached tree is available.
    ///
    /// Returns `None` for plain text or when the parser gives up.
    pub fn parse(
        &mut self,
        doc_id: DocumentId,
        source: &str,
        language: LanguageId,
        revision: u64,
    ) -> Option<Arc<ParsedFile>> {
        self.parse_snapshot(doc_id, source, language, revision)
            .map(Arc::new)
    }

    fn parse_snapshot(
        &mut self,
        doc_id: DocumentId,
        source: &str,
        language: LanguageId,
        revision: u64,
    ) -> Option<ParsedFile> {
        if language == LanguageId::PlainText {
            return None;
        }

        let Some(parser) = self.parsers.get_mut(&language) else {
            tracing::warn!("No parser for language {:?}", language);
            return None;
        };

        // Reuse the cached tree when the language still matches
        let old_tree = match self.doc_cache.get_mut(&doc_id) {
            Some(cached) if cached.language == language => {
                match compute_incremental_edit(&cached.source, source) {
                    Some(edit) => {
                        cached.tree.edit(&edit);
                        tracing::trace!(
                            "Incremental parse: edit at byte {}..{} -> {}..{}",
                            edit.start_byte,
                            edit.old_end_byte,
                            edit.start_byte,
                            edit.new_end_byte
                        );
                        Some(cached.tree.clone())
                    }
                    None => {
                        tracing::trace!("Source unchanged, reusing cached tree");
                        let tree = cached.tree.clone();
                        return Some(ParsedFile::new(
                            doc_id,
                            language,
                            revision,
                            source.to_owned(),
                            tree,
                        ));
                    }
                }
            }
            Some(cached) => {
                tracing::debug!(
                    "Language changed from {:?} to {:?}, doing full parse",
                    cached.language,
                    language
                );
                None
            }
            None => None,
        };

        let tree = match parser.parse(source, old_tree.as_ref()) {
            Some(tree) => tree,
            None if old_tree.is_some() => {
                tracing::warn!(
                    "Incremental parse failed for {:?}, falling back to full parse",
                    language
                );
                self.doc_cache.remove(&doc_id);
                match parser.parse(source, None) {
                    Some(tree) => tree,
                    None => {
                        tracing::error!("Full parse also failed for {:?}", language);
                        return None;
                    }
                }
            }
            None => {
                tracing::error!("Parse failed for {:?}", language);
                return None;
            }
        };

        self.doc_cache.insert(
            doc_id,
            DocParseState {
                language,
                tree: tree.clone(),
                source: source.to_owned(),
            },
        );

        Some(ParsedFile::new(
            doc_id,
            language,
            revision,
            source.to_owned(),
            tree,
        ))
    }

    /// Remove cached parse state for a document (call when document is closed)
    pub fn clear_doc_cache(&mut self, doc_id: DocumentId) {
        self.doc_cache.remove(&doc_id);
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}
