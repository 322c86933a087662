//! Occurrence search engine
//!
//! Engines push matches into a callback. [`TreeSitterSearch`] runs each
//! language's identifier query over the files in scope and keeps the
//! identifiers that resolve to the requested declaration.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};

use super::resolve::{ResolvedSymbol, Resolver, ScopeResolver};
use crate::syntax::{grammar, language_for, LanguageId, ParsedFile};

/// Whether a match declares the symbol or refers to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceKind {
    Declaration,
    Reference,
}

/// Which occurrence kinds a query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitTo {
    Declarations,
    References,
    #[default]
    AllOccurrences,
}

impl LimitTo {
    pub fn accepts(self, kind: OccurrenceKind) -> bool {
        match self {
            LimitTo::Declarations => kind == OccurrenceKind::Declaration,
            LimitTo::References => kind == OccurrenceKind::Reference,
            LimitTo::AllOccurrences => true,
        }
    }
}

/// A search request
#[derive(Debug, Clone)]
pub struct QuerySpecification {
    pub declaration: ResolvedSymbol,
    /// Files searched, in order
    pub scope: Vec<Arc<ParsedFile>>,
    pub limit_to: LimitTo,
}

/// Cooperative cancellation flag shared with a running search
#[derive(Debug, Clone, Default)]
pub struct ProgressToken {
    cancelled: Arc<AtomicBool>,
}

impl ProgressToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A syntax node an engine matched
#[derive(Debug, Clone)]
pub struct ElementMatch {
    pub file: Arc<ParsedFile>,
    /// Byte range in the file's snapshot
    pub range: Range<usize>,
    pub node_kind: &'static str,
    pub kind: OccurrenceKind,
}

/// What a search engine reports
#[derive(Debug, Clone)]
pub enum RawMatch {
    Element(ElementMatch),
    /// Plain-text hit with no syntax node behind it
    Text {
        file: Arc<ParsedFile>,
        range: Range<usize>,
    },
}

/// Push-style occurrence search
pub trait SearchEngine: Send + Sync {
    fn search(
        &self,
        sink: &mut dyn FnMut(RawMatch),
        spec: &QuerySpecification,
        progress: &ProgressToken,
    ) -> Result<()>;
}

/// Query-driven search over parse trees
pub struct TreeSitterSearch {
    resolver: Arc<dyn Resolver>,
    queries: HashMap<LanguageId, Query>,
}

impl TreeSitterSearch {
    /// Compile the identifier query of every parsed language
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(ScopeResolver))
    }

    pub fn with_resolver(resolver: Arc<dyn Resolver>) -> Self {
        let mut queries = HashMap::new();
        for lang in LanguageId::PARSED {
            let (Some(ts_lang), Some(grammar)) = (language_for(lang), grammar(lang)) else {
                continue;
            };
            match Query::new(&ts_lang, grammar.identifier_query) {
                Ok(query) => {
                    queries.insert(lang, query);
                }
                Err(e) => {
                    tracing::error!("Failed to compile identifier query for {:?}: {}", lang, e);
                }
            }
        }
        Self { resolver, queries }
    }

    fn search_file(
        &self,
        file: &Arc<ParsedFile>,
        sink: &mut dyn FnMut(RawMatch),
        spec: &QuerySpecification,
        progress: &ProgressToken,
    ) -> Result<()> {
        let Some(query) = self.queries.get(&file.language()) else {
            bail!(
                "no identifier query for {}",
                file.language().display_name()
            );
        };

        let source = file.source().as_bytes();
        let target = &spec.declaration;
        let mut cursor = QueryCursor::new();
        let mut captures = cursor.captures(query, file.tree().root_node(), source);

        while let Some((query_match, capture_idx)) = captures.next() {
            if progress.is_cancelled() {
                bail!("search cancelled");
            }
            let node = query_match.captures[*capture_idx].node;
            if node.utf8_text(source).ok() != Some(target.name()) {
                continue;
            }
            if self.resolver.resolve(node, file).as_ref() != Some(target) {
                continue;
            }

            let declares = file
                .scopes()
                .declaration_at(node.start_byte())
                .is_some_and(|d| d.range == node.byte_range());
            let kind = if declares {
                OccurrenceKind::Declaration
            } else {
                OccurrenceKind::Reference
            };
            if !spec.limit_to.accepts(kind) {
                continue;
            }

            sink(RawMatch::Element(ElementMatch {
                file: Arc::clone(file),
                range: node.byte_range(),
                node_kind: node.kind(),
                kind,
            }));
        }
        Ok(())
    }
}

impl Default for TreeSitterSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine for TreeSitterSearch {
    fn search(
        &self,
        sink: &mut dyn FnMut(RawMatch),
        spec: &QuerySpecification,
        progress: &ProgressToken,
    ) -> Result<()> {
        for file in &spec.scope {
            if progress.is_cancelled() {
                bail!("search cancelled");
            }
            self.search_file(file, sink, spec, progress)?;
        }
        Ok(())
    }
}
