//! Document model - the live text buffer of an open file

use std::ops::Range;
use std::path::PathBuf;

use anyhow::Result;
use ropey::Rope;

use super::DocumentId;
use crate::syntax::LanguageId;

/// Document state - the text buffer and associated file metadata.
///
/// Offsets exchanged with the editor are char indices into `buffer`.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique identifier (set by the host when the document is opened)
    pub id: Option<DocumentId>,

    /// The text buffer
    pub buffer: Rope,
    /// Path to the file on disk (None for new/unsaved files)
    pub file_path: Option<PathBuf>,
    /// Detected language
    pub language: LanguageId,
    /// Document revision counter (incremented on each edit)
    /// Used to tell parse snapshots apart from the live text
    pub revision: u64,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// Create a document with initial text
    pub fn with_text(text: &str) -> Self {
        Self {
            id: None,
            buffer: Rope::from(text),
            file_path: None,
            language: LanguageId::PlainText,
            revision: 0,
        }
    }

    pub fn with_language(mut self, language: LanguageId) -> Self {
        self.language = language;
        self
    }

    /// Load a document from a file path
    pub fn from_file(path: PathBuf) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(&path)?;
        let language = LanguageId::from_path(&path);
        Ok(Self {
            id: None,
            buffer: Rope::from(content),
            file_path: Some(path),
            language,
            revision: 0,
        })
    }

    /// Full text (allocates)
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Document length in chars
    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Insert text at a char offset
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        self.buffer.try_insert(char_idx, text)?;
        self.revision += 1;
        Ok(())
    }

    /// Remove a char range
    pub fn remove(&mut self, range: Range<usize>) -> Result<()> {
        self.buffer.try_remove(range)?;
        self.revision += 1;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_bump_revision() {
        let mut doc = Document::with_text("let x = 1;");
        doc.insert(10, " x;").unwrap();
        assert_eq!(doc.text(), "let x = 1; x;");
        doc.remove(0..4).unwrap();
        assert_eq!(doc.text(), "x = 1; x;");
        assert_eq!(doc.revision, 2);
    }

    #[test]
    fn test_out_of_bounds_edit_is_an_error() {
        let mut doc = Document::with_text("abc");
        assert!(doc.insert(10, "x").is_err());
        assert_eq!(doc.revision, 0);
    }
}
