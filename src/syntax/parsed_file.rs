//! Immutable parse snapshot of a document

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tree_sitter::{Node, Tree};

use super::grammar::{grammar, Grammar};
use super::languages::LanguageId;
use super::scopes::ScopeIndex;
use crate::model::DocumentId;

/// A parsed snapshot of one document.
///
/// Shared read-only between the editor thread and background jobs; the
/// source text is the exact text the tree was built from, which may lag
/// behind the live document.
#[derive(Debug)]
pub struct ParsedFile {
    document: DocumentId,
    path: Option<PathBuf>,
    language: LanguageId,
    revision: u64,
    source: String,
    tree: Tree,
    scopes: OnceLock<ScopeIndex>,
}

impl ParsedFile {
    pub fn new(
        document: DocumentId,
        language: LanguageId,
        revision: u64,
        source: String,
        tree: Tree,
    ) -> Self {
        Self {
            document,
            path: None,
            language,
            revision,
            source,
            tree,
            scopes: OnceLock::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Document revision this snapshot was parsed from
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn grammar(&self) -> Option<&'static Grammar> {
        grammar(self.language)
    }

    /// Snapshot text of a byte range
    pub fn text_of(&self, range: Range<usize>) -> Option<&str> {
        self.source.get(range)
    }

    /// Identifier node covering `byte`.
    ///
    /// The range is start-inclusive and end-exclusive, so a caret right after
    /// an identifier is not on it. Comments, literals, whitespace and
    /// punctuation yield `None`.
    pub fn identifier_at(&self, byte: usize) -> Option<Node<'_>> {
        let grammar = self.grammar()?;
        if byte >= self.source.len() {
            return None;
        }
        let node = self
            .tree
            .root_node()
            .descendant_for_byte_range(byte, byte + 1)?;

        if !grammar.is_identifier(node.kind()) || !node.byte_range().contains(&byte) {
            return None;
        }
        Some(node)
    }

    /// Lexical scopes of this snapshot, built on first use
    pub fn scopes(&self) -> &ScopeIndex {
        self.scopes.get_or_init(|| match self.grammar() {
            Some(grammar) => ScopeIndex::build(&self.tree, &self.source, grammar),
            None => ScopeIndex::default(),
        })
    }
}
