//! Editor-side model: documents, views and selections

pub mod document;
pub mod selection;

pub use document::Document;
pub use selection::{Selection, SelectionEvent};

/// Unique identifier for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentId(pub u64);

/// Unique identifier for an editor view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);
