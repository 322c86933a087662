//! Span derivation: search matches to live document coordinates

use std::ops::Range;

use super::search::ElementMatch;
use crate::model::Document;
use crate::syntax::{ParsedFile, SnapshotMapping};

/// One occurrence in document coordinates (char offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Non-empty and inside a document of `len` chars
    pub fn fits(&self, len: usize) -> bool {
        self.length > 0 && self.end() <= len
    }
}

/// Derive the live-document span of a matched identifier.
///
/// The length comes from the node itself. Matches that are not identifiers,
/// have no width, sit inside text edited since the parse, or no longer read
/// as the same whole identifier in the live buffer yield `None`.
pub fn derive_span(
    element: &ElementMatch,
    document: &Document,
    mapping: &SnapshotMapping,
) -> Option<Span> {
    derive_node_span(
        &element.file,
        element.range.clone(),
        element.node_kind,
        document,
        mapping,
    )
}

/// Live span of the identifier node at `range` in `file`'s snapshot
pub fn derive_node_span(
    file: &ParsedFile,
    range: Range<usize>,
    node_kind: &str,
    document: &Document,
    mapping: &SnapshotMapping,
) -> Option<Span> {
    let grammar = file.grammar()?;
    if !grammar.is_identifier(node_kind) || range.is_empty() {
        return None;
    }
    let name = file.text_of(range.clone())?;

    let live = mapping.range_to_live(range.clone())?;
    let live_text = document.buffer.get_byte_slice(live.clone())?;
    if live_text != name {
        tracing::trace!(
            "Dropping match at {:?}: live text no longer reads {:?}",
            range,
            name
        );
        return None;
    }

    let offset = document.buffer.try_byte_to_char(live.start).ok()?;
    let length = name.chars().count();

    // An edit touching either edge can glue the name onto a longer token
    let source = file.source();
    let before = source[..range.start].chars().next_back();
    let after = source[range.end..].chars().next();
    let live_before = offset.checked_sub(1).and_then(|i| document.buffer.get_char(i));
    let live_after = document.buffer.get_char(offset + length);
    if grew_into(before, live_before) || grew_into(after, live_after) {
        tracing::trace!("Dropping match at {:?}: {:?} now part of a longer token", range, name);
        return None;
    }

    let span = Span::new(offset, length);
    span.fits(document.len_chars()).then_some(span)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// A boundary char that became an identifier char
fn grew_into(snapshot: Option<char>, live: Option<char>) -> bool {
    !snapshot.is_some_and(is_identifier_char) && live.is_some_and(is_identifier_char)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::DocumentId;
    use crate::occurrences::search::OccurrenceKind;
    use crate::syntax::{LanguageId, ParserState};

    fn parse(source: &str) -> Arc<ParsedFile> {
        ParserState::new()
            .parse(DocumentId(1), source, LanguageId::JavaScript, 1)
            .unwrap()
    }

    fn element(file: &Arc<ParsedFile>, start: usize, end: usize) -> ElementMatch {
        let node = file
            .tree()
            .root_node()
            .descendant_for_byte_range(start, end)
            .unwrap();
        ElementMatch {
            file: Arc::clone(file),
            range: node.byte_range(),
            node_kind: node.kind(),
            kind: OccurrenceKind::Reference,
        }
    }

    #[test]
    fn test_span_bounds() {
        assert!(Span::new(4, 1).fits(5));
        assert!(!Span::new(4, 2).fits(5));
        assert!(!Span::new(0, 0).fits(5));
        assert_eq!(Span::new(17, 1).end(), 18);
    }

    #[test]
    fn test_identifier_span_in_unchanged_document() {
        let source = "let x = 1; print(x)";
        let file = parse(source);
        let document = Document::with_text(source);
        let span = derive_span(&element(&file, 17, 18), &document, &SnapshotMapping::identity());
        assert_eq!(span, Some(Span::new(17, 1)));
    }

    #[test]
    fn test_span_offsets_are_chars() {
        let source = "let café = 1; log(café)";
        let file = parse(source);
        let document = Document::with_text(source);
        let start = source.rfind("café").unwrap();
        let span = derive_span(
            &element(&file, start, start + 1),
            &document,
            &SnapshotMapping::identity(),
        );
        assert_eq!(span, Some(Span::new(18, 4)));
    }

    #[test]
    fn test_span_follows_whitespace_edit() {
        let snapshot = "let x = 1; print(x)";
        let live = "let x = 1;   print(x)";
        let file = parse(snapshot);
        let document = Document::with_text(live);
        let mapping = SnapshotMapping::between(snapshot, live);
        assert_eq!(
            derive_span(&element(&file, 17, 18), &document, &mapping),
            Some(Span::new(19, 1))
        );
    }

    #[test]
    fn test_renamed_identifier_is_dropped() {
        let snapshot = "let x = 1; print(x)";
        let live = "let x = 1; print(y)";
        let file = parse(snapshot);
        let document = Document::with_text(live);
        let mapping = SnapshotMapping::between(snapshot, live);
        assert_eq!(derive_span(&element(&file, 17, 18), &document, &mapping), None);
    }

    #[test]
    fn test_identifier_extended_at_either_edge_is_dropped() {
        let snapshot = "let x = 1; print(x)";
        let file = parse(snapshot);
        for live in ["let x = 1; print(xx)", "let x = 1; print(ax)"] {
            let document = Document::with_text(live);
            let mapping = SnapshotMapping::between(snapshot, live);
            assert_eq!(
                derive_span(&element(&file, 17, 18), &document, &mapping),
                None,
                "{}",
                live
            );
            assert_eq!(
                derive_span(&element(&file, 4, 5), &document, &mapping),
                Some(Span::new(4, 1))
            );
        }
    }

    #[test]
    fn test_non_identifier_is_dropped() {
        let source = "let x = 1; print(x)";
        let file = parse(source);
        let document = Document::with_text(source);
        let number = element(&file, 8, 9);
        assert_eq!(number.node_kind, "number");
        assert_eq!(derive_span(&number, &document, &SnapshotMapping::identity()), None);
    }
}
