//! Atomic replacement of the occurrence decoration set
//!
//! Every commit carries the ticket handed out when its job was scheduled.
//! The set is swapped inside the host model's lock, and a commit whose
//! ticket is older than the last applied one is rejected. Handles are only
//! ever removed from the model that issued them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::{Decoration, DecorationHost, DecorationId, DecorationModel};
use crate::occurrences::Span;

/// Outcome of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied { removed: usize, added: usize },
    /// A newer ticket already committed
    Superseded { ticket: u64, committed: u64 },
    /// No model to draw into
    ModelUnavailable,
}

#[derive(Debug, Default)]
struct Committed {
    handles: Vec<DecorationId>,
    ticket: u64,
    /// Model the handles belong to
    model: Option<Weak<Mutex<dyn DecorationModel + Send>>>,
}

impl Committed {
    fn forget_handles(&mut self) {
        if !self.handles.is_empty() {
            tracing::debug!("Forgetting {} decorations of a gone model", self.handles.len());
        }
        self.handles.clear();
        self.model = None;
    }
}

/// Owner of the currently visible occurrence decorations
pub struct DecorationSynchronizer {
    host: Arc<dyn DecorationHost>,
    state: Mutex<Committed>,
    tickets: AtomicU64,
    discard_superseded: bool,
}

impl DecorationSynchronizer {
    pub fn new(host: Arc<dyn DecorationHost>, discard_superseded: bool) -> Self {
        Self {
            host,
            state: Mutex::new(Committed::default()),
            tickets: AtomicU64::new(0),
            discard_superseded,
        }
    }

    /// Next job ticket; strictly increasing
    pub fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the visible set with `spans` under a fresh ticket
    pub fn replace_all(&self, spans: &[Span]) -> Commit {
        let ticket = self.next_ticket();
        self.commit(ticket, spans)
    }

    /// Replace the visible set with `spans` unless `ticket` is stale.
    ///
    /// Lock order: host model, then own state.
    pub fn commit(&self, ticket: u64, spans: &[Span]) -> Commit {
        let Some(shared) = self.host.decoration_model() else {
            tracing::debug!("Ticket {}: no decoration model, skipping", ticket);
            self.forget_handles();
            return Commit::ModelUnavailable;
        };
        let Ok(mut model) = shared.lock() else {
            tracing::warn!("Ticket {}: decoration model lock poisoned", ticket);
            self.forget_handles();
            return Commit::ModelUnavailable;
        };
        let Ok(mut state) = self.state.lock() else {
            tracing::warn!("Ticket {}: decoration state lock poisoned", ticket);
            return Commit::ModelUnavailable;
        };

        let current = Arc::downgrade(&shared);
        if !state.model.as_ref().is_some_and(|m| m.ptr_eq(&current)) {
            state.forget_handles();
            state.model = Some(current);
        }

        if self.discard_superseded && ticket < state.ticket {
            tracing::debug!(
                "Ticket {} superseded by committed ticket {}",
                ticket,
                state.ticket
            );
            return Commit::Superseded {
                ticket,
                committed: state.ticket,
            };
        }

        let added = spans.iter().copied().map(Decoration::occurrence).collect();
        let handles = model.replace(&state.handles, added);
        let removed = std::mem::replace(&mut state.handles, handles).len();
        state.ticket = state.ticket.max(ticket);

        tracing::trace!(
            "Ticket {}: replaced {} decorations with {}",
            ticket,
            removed,
            state.handles.len()
        );
        Commit::Applied {
            removed,
            added: state.handles.len(),
        }
    }

    fn forget_handles(&self) {
        match self.state.lock() {
            Ok(mut state) => state.forget_handles(),
            Err(poisoned) => poisoned.into_inner().forget_handles(),
        }
    }

    /// Handles currently held
    pub fn current(&self) -> Vec<DecorationId> {
        match self.state.lock() {
            Ok(state) => state.handles.clone(),
            Err(poisoned) => poisoned.into_inner().handles.clone(),
        }
    }

    /// Ticket of the last applied commit (0 before any)
    pub fn committed_ticket(&self) -> u64 {
        match self.state.lock() {
            Ok(state) => state.ticket,
            Err(poisoned) => poisoned.into_inner().ticket,
        }
    }
}
