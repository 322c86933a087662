//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mark_occurrences::decorations::{
    AnnotationModel, DecorationHost, DecorationModel, SharedDecorationModel, OCCURRENCE_CATEGORY,
};
use mark_occurrences::model::{Document, DocumentId, ViewId};
use mark_occurrences::occurrences::{OccurrencePipeline, ProgressToken, Span};
use mark_occurrences::reactor::EditorView;
use mark_occurrences::syntax::{LanguageId, ParsedFile, ParserState};

pub const VIEW: ViewId = ViewId(1);

/// Parse `source` as `language`
pub fn parse(source: &str, language: LanguageId) -> Arc<ParsedFile> {
    ParserState::new()
        .parse(DocumentId(1), source, language, 1)
        .expect("source parses")
}

/// Occurrences at `caret` in an unedited document
pub fn occurrences_at(source: &str, language: LanguageId, caret: usize) -> Option<Vec<Span>> {
    let parsed = parse(source, language);
    let document = Document::with_text(source).with_language(language);
    OccurrencePipeline::default().find_occurrences_at(
        &parsed,
        &document,
        caret,
        &ProgressToken::new(),
    )
}

/// Sorted occurrence spans at `caret`, empty when nothing is there
pub fn sorted_spans(source: &str, language: LanguageId, caret: usize) -> Vec<Span> {
    let mut spans = occurrences_at(source, language, caret).unwrap_or_default();
    spans.sort();
    spans
}

/// Char offset of the `nth` (0-based) occurrence of `needle`
pub fn nth_offset(source: &str, needle: &str, nth: usize) -> usize {
    let (byte, _) = source
        .match_indices(needle)
        .nth(nth)
        .expect("needle occurs often enough");
    source[..byte].chars().count()
}

/// An editor view over one document with an in-memory decoration model
pub struct FakeEditor {
    view: ViewId,
    parser: Mutex<ParserState>,
    document: Mutex<Option<Document>>,
    parsed: Mutex<Option<Arc<ParsedFile>>>,
    model: Mutex<Option<SharedDecorationModel>>,
}

impl FakeEditor {
    pub fn open(text: &str, language: LanguageId) -> Arc<Self> {
        let mut document = Document::with_text(text).with_language(language);
        document.id = Some(DocumentId(1));
        let mut parser = ParserState::new();
        let parsed = parser.parse_document(&document);

        Arc::new(Self {
            view: VIEW,
            parser: Mutex::new(parser),
            document: Mutex::new(Some(document)),
            parsed: Mutex::new(parsed),
            model: Mutex::new(Some(AnnotationModel::shared())),
        })
    }

    /// Edit the live text without re-parsing
    pub fn insert(&self, char_idx: usize, text: &str) {
        let mut document = self.document.lock().unwrap();
        document.as_mut().unwrap().insert(char_idx, text).unwrap();
    }

    pub fn reparse(&self) {
        let document = self.document.lock().unwrap();
        let parsed = document
            .as_ref()
            .and_then(|d| self.parser.lock().unwrap().parse_document(d));
        *self.parsed.lock().unwrap() = parsed;
    }

    /// Close the document and drop its decoration model
    pub fn close(&self) {
        *self.document.lock().unwrap() = None;
        *self.parsed.lock().unwrap() = None;
        *self.model.lock().unwrap() = None;
    }

    /// Swap in another decoration model, as a host does when it reloads a document
    pub fn replace_model(&self, model: SharedDecorationModel) {
        *self.model.lock().unwrap() = Some(model);
    }

    pub fn model(&self) -> SharedDecorationModel {
        self.model.lock().unwrap().clone().expect("document open")
    }

    /// Sorted spans of the visible occurrence decorations
    pub fn highlighted(&self) -> Vec<Span> {
        let model = self.model();
        let model = model.lock().unwrap();
        let mut spans: Vec<Span> = model
            .decorations()
            .into_iter()
            .filter(|(_, d)| d.category == OCCURRENCE_CATEGORY)
            .map(|(_, d)| d.span)
            .collect();
        spans.sort();
        spans
    }
}

impl DecorationHost for FakeEditor {
    fn decoration_model(&self) -> Option<SharedDecorationModel> {
        self.model.lock().unwrap().clone()
    }
}

impl EditorView for FakeEditor {
    fn view_id(&self) -> ViewId {
        self.view
    }

    fn parsed_file(&self) -> Option<Arc<ParsedFile>> {
        self.parsed.lock().unwrap().clone()
    }

    fn document(&self) -> Option<Document> {
        self.document.lock().unwrap().clone()
    }
}
