//! Decorations: visual highlights owned by the host's decoration model

pub mod synchronizer;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::occurrences::Span;

pub use synchronizer::{Commit, DecorationSynchronizer};

/// Category tag of occurrence highlights
pub const OCCURRENCE_CATEGORY: &str = "occurrence";

/// Handle of a decoration in a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub category: &'static str,
    pub description: String,
    pub span: Span,
}

impl Decoration {
    /// Plain occurrence highlight over `span`
    pub fn occurrence(span: Span) -> Self {
        Self {
            category: OCCURRENCE_CATEGORY,
            description: String::new(),
            span,
        }
    }
}

/// Host decoration store
pub trait DecorationModel {
    /// Remove `remove` and add `add` as one batch, returning the new handles
    /// in `add` order. Unknown handles in `remove` are ignored.
    fn replace(&mut self, remove: &[DecorationId], add: Vec<Decoration>) -> Vec<DecorationId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every decoration, ordered by handle
    fn decorations(&self) -> Vec<(DecorationId, Decoration)>;
}

/// A decoration model behind the host's lock
pub type SharedDecorationModel = Arc<Mutex<dyn DecorationModel + Send>>;

/// Something that may currently expose a decoration model
pub trait DecorationHost: Send + Sync {
    /// `None` when no document is open
    fn decoration_model(&self) -> Option<SharedDecorationModel>;
}

/// In-memory decoration model
#[derive(Debug, Default)]
pub struct AnnotationModel {
    decorations: BTreeMap<DecorationId, Decoration>,
    next_id: u64,
}

impl AnnotationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// New empty model behind a shared lock
    pub fn shared() -> SharedDecorationModel {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn get(&self, id: DecorationId) -> Option<&Decoration> {
        self.decorations.get(&id)
    }

    /// Spans of decorations in `category`, sorted
    pub fn spans(&self, category: &str) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .decorations
            .values()
            .filter(|d| d.category == category)
            .map(|d| d.span)
            .collect();
        spans.sort();
        spans
    }
}

impl DecorationModel for AnnotationModel {
    fn replace(&mut self, remove: &[DecorationId], add: Vec<Decoration>) -> Vec<DecorationId> {
        for id in remove {
            self.decorations.remove(id);
        }
        add.into_iter()
            .map(|decoration| {
                self.next_id += 1;
                let id = DecorationId(self.next_id);
                self.decorations.insert(id, decoration);
                id
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.decorations.len()
    }

    fn decorations(&self) -> Vec<(DecorationId, Decoration)> {
        self.decorations
            .iter()
            .map(|(id, d)| (*id, d.clone()))
            .collect()
    }
}
