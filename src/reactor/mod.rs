//! Selection reactor: turns selection changes into background highlight jobs

mod job;
pub mod worker;

use std::sync::Arc;

use anyhow::Result;

use crate::config::OccurrenceConfig;
use crate::decorations::{DecorationHost, DecorationSynchronizer};
use crate::model::{Document, Selection, SelectionEvent, ViewId};
use crate::occurrences::{OccurrencePipeline, ProgressToken};
use crate::syntax::ParsedFile;

use job::{HighlightJob, InFlight};
pub use worker::WorkerPool;

/// The editor view a reactor is attached to
pub trait EditorView: DecorationHost {
    fn view_id(&self) -> ViewId;

    /// Latest parse of the open document, possibly older than its text
    fn parsed_file(&self) -> Option<Arc<ParsedFile>>;

    /// Live document, `None` once closed
    fn document(&self) -> Option<Document>;
}

/// Highlights occurrences of the symbol under the caret of one view
pub struct SelectionReactor<E: EditorView + 'static> {
    editor: Arc<E>,
    config: OccurrenceConfig,
    pipeline: Arc<OccurrencePipeline>,
    synchronizer: Arc<DecorationSynchronizer>,
    in_flight: Option<Arc<InFlight>>,
    pool: WorkerPool,
}

impl<E: EditorView + 'static> SelectionReactor<E> {
    pub fn new(editor: Arc<E>, config: OccurrenceConfig) -> Result<Self> {
        Self::with_pipeline(editor, config, OccurrencePipeline::default())
    }

    pub fn with_pipeline(
        editor: Arc<E>,
        config: OccurrenceConfig,
        pipeline: OccurrencePipeline,
    ) -> Result<Self> {
        let pool = WorkerPool::new(config.worker_threads)?;
        let host: Arc<dyn DecorationHost> = editor.clone();
        let synchronizer = Arc::new(DecorationSynchronizer::new(host, config.discard_superseded));
        let in_flight = config.discard_superseded.then(Arc::default);

        tracing::debug!(
            "Selection reactor for view {:?} with {} workers",
            editor.view_id(),
            pool.thread_count()
        );

        Ok(Self {
            editor,
            config,
            pipeline: Arc::new(pipeline),
            synchronizer,
            in_flight,
            pool,
        })
    }

    /// Handle a selection change in any view.
    ///
    /// Schedules one background job for text selections in the owned view
    /// and returns without waiting. Returns whether a job was scheduled.
    pub fn on_selection_changed(&self, view: ViewId, selection: &Selection) -> bool {
        if !self.config.enabled {
            return false;
        }
        if view != self.editor.view_id() {
            tracing::trace!("Ignoring selection in foreign view {:?}", view);
            return false;
        }
        let Selection::Text { offset, length } = *selection else {
            return false;
        };

        let ticket = self.synchronizer.next_ticket();
        let progress = ProgressToken::new();
        if let Some(in_flight) = &self.in_flight {
            in_flight.register(ticket, progress.clone());
        }

        let job = HighlightJob {
            ticket,
            offset,
            length,
            range_selection: self.config.range_selection,
            progress,
            editor: Arc::clone(&self.editor),
            pipeline: Arc::clone(&self.pipeline),
            synchronizer: Arc::clone(&self.synchronizer),
            in_flight: self.in_flight.clone(),
        };
        tracing::trace!("Scheduling ticket {} at offset {}", ticket, offset);
        self.pool.execute(move || job.run());
        true
    }

    pub fn handle_event(&self, event: &SelectionEvent) -> bool {
        self.on_selection_changed(event.view, &event.selection)
    }

    /// Block until every scheduled job has finished
    pub fn wait_idle(&self) {
        self.pool.wait_idle();
    }

    pub fn synchronizer(&self) -> &Arc<DecorationSynchronizer> {
        &self.synchronizer
    }

    pub fn config(&self) -> &OccurrenceConfig {
        &self.config
    }
}
