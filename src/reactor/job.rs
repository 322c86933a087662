//! One background highlight run

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::EditorView;
use crate::config::RangeSelection;
use crate::decorations::{Commit, DecorationSynchronizer};
use crate::occurrences::{element_at, snapshot_mapping, OccurrencePipeline, ProgressToken};

/// Progress tokens of scheduled jobs that have not finished, by ticket
#[derive(Debug, Default)]
pub(super) struct InFlight {
    jobs: Mutex<BTreeMap<u64, ProgressToken>>,
}

impl InFlight {
    pub fn register(&self, ticket: u64, progress: ProgressToken) {
        self.lock().insert(ticket, progress);
    }

    pub fn finish(&self, ticket: u64) {
        self.lock().remove(&ticket);
    }

    /// Cancel every job scheduled before `ticket`
    pub fn supersede(&self, ticket: u64) {
        let mut jobs = self.lock();
        let newer = jobs.split_off(&ticket);
        for (older, progress) in std::mem::replace(&mut *jobs, newer) {
            tracing::trace!("Ticket {} cancels ticket {}", ticket, older);
            progress.cancel();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, ProgressToken>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Work bound to one selection event
pub(super) struct HighlightJob<E: EditorView> {
    pub ticket: u64,
    pub offset: usize,
    pub length: usize,
    pub range_selection: RangeSelection,
    pub progress: ProgressToken,
    pub editor: Arc<E>,
    pub pipeline: Arc<OccurrencePipeline>,
    pub synchronizer: Arc<DecorationSynchronizer>,
    /// Set when superseded jobs should be cancelled
    pub in_flight: Option<Arc<InFlight>>,
}

impl<E: EditorView> HighlightJob<E> {
    pub fn run(self) {
        self.highlight();
        if let Some(in_flight) = &self.in_flight {
            in_flight.finish(self.ticket);
        }
    }

    /// Resolve, search, commit. Every failure leaves the decorations as they are.
    fn highlight(&self) {
        if self.progress.is_cancelled() {
            tracing::trace!("Ticket {} cancelled before start", self.ticket);
            return;
        }
        let Some(parsed) = self.editor.parsed_file() else {
            tracing::debug!("Ticket {}: no parsed file", self.ticket);
            return;
        };
        if !parsed.language().supports_occurrences() {
            tracing::trace!(
                "Ticket {}: {} has no symbols",
                self.ticket,
                parsed.language().display_name()
            );
            return;
        }
        let Some(document) = self.editor.document() else {
            tracing::debug!("Ticket {}: document closed", self.ticket);
            return;
        };

        let mapping = snapshot_mapping(&parsed, &document);
        let Some(element) = element_at(
            &parsed,
            &document,
            &mapping,
            self.offset,
            self.length,
            self.range_selection,
        ) else {
            tracing::trace!("Ticket {}: nothing at offset {}", self.ticket, self.offset);
            return;
        };

        // This job will commit, so older results can no longer be shown
        if let Some(in_flight) = &self.in_flight {
            in_flight.supersede(self.ticket);
        }

        let spans = self.pipeline.find_occurrences_mapped(
            element,
            &parsed,
            &document,
            &mapping,
            &self.progress,
        );

        if self.progress.is_cancelled() {
            tracing::trace!("Ticket {} superseded while searching", self.ticket);
            return;
        }

        match self.synchronizer.commit(self.ticket, &spans) {
            Commit::Applied { removed, added } => {
                tracing::trace!(
                    "Ticket {}: {} occurrences (was {})",
                    self.ticket,
                    added,
                    removed
                );
            }
            Commit::Superseded { committed, .. } => {
                tracing::debug!("Ticket {} dropped, {} already shown", self.ticket, committed);
            }
            Commit::ModelUnavailable => {
                tracing::debug!("Ticket {}: decoration model unavailable", self.ticket);
            }
        }
    }
}
