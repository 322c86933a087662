//! Mark-occurrences core: from an identifier to highlightable spans
//!
//! - `resolve`: identifier node to symbol
//! - `search`: engine enumerating the symbol's occurrences
//! - `query`: adapter draining an engine into a list
//! - `span`: match to live document span
//! - `pipeline`: the three steps glued together

pub mod pipeline;
pub mod query;
pub mod resolve;
pub mod search;
pub mod span;

pub use pipeline::{element_at, snapshot_mapping, OccurrencePipeline};
pub use resolve::{ResolvedSymbol, Resolver, ScopeResolver};
pub use search::{
    ElementMatch, LimitTo, OccurrenceKind, ProgressToken, QuerySpecification, RawMatch,
    SearchEngine, TreeSitterSearch,
};
pub use span::{derive_node_span, derive_span, Span};
