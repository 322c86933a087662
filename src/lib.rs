//! Mark occurrences - highlight every occurrence of the symbol under the caret
//!
//! A selection change in an editor view schedules a background job that
//! resolves the identifier at the caret, searches the file for the same
//! symbol and swaps the view's occurrence decorations in one batch.

pub mod config;
pub mod config_paths;
pub mod decorations;
pub mod model;
pub mod occurrences;
pub mod reactor;
pub mod syntax;
pub mod tracing;

// Re-export commonly used types
pub use config::{OccurrenceConfig, RangeSelection};
pub use decorations::{AnnotationModel, DecorationHost, DecorationSynchronizer};
pub use model::{Document, DocumentId, Selection, SelectionEvent, ViewId};
pub use occurrences::{OccurrencePipeline, ProgressToken, Span};
pub use reactor::{EditorView, SelectionReactor};
pub use syntax::{LanguageId, ParsedFile, ParserState};
