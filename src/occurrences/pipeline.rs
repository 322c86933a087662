//! Occurrence pipeline: resolve, query, derive spans

use std::sync::Arc;

use tree_sitter::Node;

use super::query;
use super::resolve::{Resolver, ScopeResolver};
use super::search::{LimitTo, ProgressToken, RawMatch, SearchEngine, TreeSitterSearch};
use super::span::{derive_node_span, derive_span, Span};
use crate::config::RangeSelection;
use crate::model::Document;
use crate::syntax::{ParsedFile, SnapshotMapping};

/// Finds the occurrences of the symbol under a caret within one file
pub struct OccurrencePipeline {
    resolver: Arc<dyn Resolver>,
    engine: Arc<dyn SearchEngine>,
}

impl OccurrencePipeline {
    pub fn new(resolver: Arc<dyn Resolver>, engine: Arc<dyn SearchEngine>) -> Self {
        Self { resolver, engine }
    }

    /// Spans of every occurrence of the symbol `element` names, in engine order.
    ///
    /// An element that does not resolve yields no spans.
    pub fn find_occurrences(
        &self,
        element: Node<'_>,
        parsed: &Arc<ParsedFile>,
        document: &Document,
        progress: &ProgressToken,
    ) -> Vec<Span> {
        let mapping = snapshot_mapping(parsed, document);
        self.find_occurrences_mapped(element, parsed, document, &mapping, progress)
    }

    /// [`find_occurrences`](Self::find_occurrences) with a precomputed
    /// snapshot mapping
    pub fn find_occurrences_mapped(
        &self,
        element: Node<'_>,
        parsed: &Arc<ParsedFile>,
        document: &Document,
        mapping: &SnapshotMapping,
        progress: &ProgressToken,
    ) -> Vec<Span> {
        let Some(symbol) = self.resolver.resolve(element, parsed) else {
            tracing::trace!("{} at {:?} does not resolve", element.kind(), element.byte_range());
            return Vec::new();
        };

        let matches = query::search(
            self.engine.as_ref(),
            symbol,
            vec![Arc::clone(parsed)],
            LimitTo::AllOccurrences,
            progress,
        );

        let spans: Vec<Span> = matches
            .iter()
            .filter_map(|m| match m {
                RawMatch::Element(found) if found.file.document() == parsed.document() => {
                    derive_span(found, document, mapping)
                }
                _ => None,
            })
            .collect();

        tracing::trace!("{} matches, {} spans", matches.len(), spans.len());
        spans
    }

    /// Occurrences of the identifier at `caret` (char offset).
    ///
    /// `None` reports the empty result for a caret that is not on an
    /// identifier (whitespace, punctuation, comments, literals). Callers
    /// treat it as "leave existing highlights alone", unlike `Some(vec![])`
    /// for an identifier whose occurrences could not be placed.
    pub fn find_occurrences_at(
        &self,
        parsed: &Arc<ParsedFile>,
        document: &Document,
        caret: usize,
        progress: &ProgressToken,
    ) -> Option<Vec<Span>> {
        self.find_occurrences_for_selection(
            parsed,
            document,
            caret,
            0,
            RangeSelection::Start,
            progress,
        )
    }

    /// Occurrences for a text selection of `length` chars at `offset`.
    ///
    /// `None` when the selection picks no identifier, as for
    /// [`find_occurrences_at`](Self::find_occurrences_at).
    pub fn find_occurrences_for_selection(
        &self,
        parsed: &Arc<ParsedFile>,
        document: &Document,
        offset: usize,
        length: usize,
        mode: RangeSelection,
        progress: &ProgressToken,
    ) -> Option<Vec<Span>> {
        let mapping = snapshot_mapping(parsed, document);
        let element = element_at(parsed, document, &mapping, offset, length, mode)?;
        Some(self.find_occurrences_mapped(element, parsed, document, &mapping, progress))
    }
}

/// Snapshot mapping between a parse and the live document
pub fn snapshot_mapping(parsed: &ParsedFile, document: &Document) -> SnapshotMapping {
    SnapshotMapping::between(parsed.source(), &document.text())
}

/// Identifier picked by a selection of `length` chars at `offset`.
///
/// The identifier must still read the same, as a whole token, in the live
/// document.
pub fn element_at<'a>(
    parsed: &'a ParsedFile,
    document: &Document,
    mapping: &SnapshotMapping,
    offset: usize,
    length: usize,
    mode: RangeSelection,
) -> Option<Node<'a>> {
    let start = snapshot_byte(document, mapping, offset)?;
    let element = parsed.identifier_at(start)?;

    let intact = derive_node_span(parsed, element.byte_range(), element.kind(), document, mapping);
    if intact.is_none() {
        tracing::trace!("Identifier at {} was edited since the parse", offset);
        return None;
    }

    if mode == RangeSelection::Enclosing && length > 0 {
        let end = snapshot_byte(document, mapping, offset + length)?;
        if end > element.end_byte() {
            tracing::trace!("Selection {}..{} leaves the identifier", offset, offset + length);
            return None;
        }
    }

    Some(element)
}

impl Default for OccurrencePipeline {
    fn default() -> Self {
        let resolver: Arc<dyn Resolver> = Arc::new(ScopeResolver);
        let engine = Arc::new(TreeSitterSearch::with_resolver(Arc::clone(&resolver)));
        Self::new(resolver, engine)
    }
}

/// Live char offset to snapshot byte offset
fn snapshot_byte(document: &Document, mapping: &SnapshotMapping, offset: usize) -> Option<usize> {
    let byte = document.buffer.try_char_to_byte(offset).ok()?;
    mapping.to_snapshot(byte)
}
