//! Occurrence query adapter
//!
//! Shapes a search request for a [`SearchEngine`] and drains its callback
//! into a finite list. No caching, no retry.

use std::sync::Arc;

use super::resolve::ResolvedSymbol;
use super::search::{LimitTo, ProgressToken, QuerySpecification, RawMatch, SearchEngine};
use crate::syntax::ParsedFile;

/// Run one scoped search. A failed search yields no matches.
pub fn search(
    engine: &dyn SearchEngine,
    declaration: ResolvedSymbol,
    scope_files: Vec<Arc<ParsedFile>>,
    limit_to: LimitTo,
    progress: &ProgressToken,
) -> Vec<RawMatch> {
    let spec = QuerySpecification {
        declaration,
        scope: scope_files,
        limit_to,
    };

    let mut matches = Vec::new();
    let result = engine.search(&mut |m| matches.push(m), &spec, progress);
    match result {
        Ok(()) => matches,
        Err(e) => {
            tracing::debug!(
                "Occurrence search for {:?} failed after {} matches: {:#}",
                spec.declaration.name(),
                matches.len(),
                e
            );
            Vec::new()
        }
    }
}
