use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ProcessingConfig;
use crate::extraction::Extractor;
use crate::models::{ItemId, Language, SourceFile};
use crate::store::{ItemStore, StatusUpdate, UpdateOutcome};

/// How a single `process_item` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Done,
    /// Extraction failed; the item is now in `error`.
    Failed(String),
    /// Refused because the item was already processing and the duplicate
    /// guard is on.
    Skipped,
    /// No such item when processing was requested.
    Missing,
    /// The item was removed or resubmitted before the result arrived, so the
    /// result was dropped.
    Discarded,
}

/// Drives items through `pending -> processing -> done | error`.
///
/// Cheap to clone; clones share the store, the extractor and the selected
/// language.
#[derive(Clone)]
pub struct ProcessingController {
    store: Arc<ItemStore>,
    extractor: Arc<dyn Extractor>,
    language: Arc<RwLock<Language>>,
    guard_duplicates: bool,
}

impl ProcessingController {
    pub fn new(
        store: Arc<ItemStore>,
        extractor: Arc<dyn Extractor>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            language: Arc::new(RwLock::new(config.language)),
            guard_duplicates: config.guard_duplicates,
        }
    }

    pub fn store(&self) -> &Arc<ItemStore> {
        &self.store
    }

    pub fn language(&self) -> Language {
        *self.language.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Changes the language used by submissions started from now on.
    pub fn set_language(&self, language: Language) {
        *self.language.write().unwrap_or_else(PoisonError::into_inner) = language;
        info!(%language, "Target language changed");
    }

    /// Processes one item. Failures end in the item's `error` state and are
    /// reported only through the returned outcome.
    pub async fn process_item(&self, id: ItemId) -> ProcessOutcome {
        match self.begin(id) {
            Ok(submission) => self.finish(submission).await,
            Err(outcome) => outcome,
        }
    }

    /// Moves the item into `processing` and captures its source and the
    /// current language. Runs synchronously so the status change is visible
    /// as soon as the caller returns.
    fn begin(&self, id: ItemId) -> Result<Submission, ProcessOutcome> {
        let number = match self.store.update_status(
            &id,
            StatusUpdate::Processing {
                exclusive: self.guard_duplicates,
            },
        ) {
            UpdateOutcome::Applied { submission } => submission,
            UpdateOutcome::Busy => {
                debug!(item_id = %id, "Item already processing, submission skipped");
                return Err(ProcessOutcome::Skipped);
            }
            UpdateOutcome::Missing => return Err(ProcessOutcome::Missing),
            other => {
                warn!(item_id = %id, outcome = ?other, "Unexpected outcome starting submission");
                return Err(ProcessOutcome::Missing);
            }
        };

        let source = self.store.source(&id).ok_or(ProcessOutcome::Discarded)?;

        Ok(Submission {
            id,
            number,
            source,
            language: self.language(),
        })
    }

    async fn finish(&self, submission: Submission) -> ProcessOutcome {
        let Submission {
            id,
            number,
            source,
            language,
        } = submission;

        debug!(item_id = %id, submission = number, %language, "Extraction started");
        let result = self.extractor.extract(&source, language).await;

        let (update, outcome) = match result {
            Ok(extraction) => (
                StatusUpdate::Done {
                    submission: number,
                    original_text: extraction.original,
                    translated_text: extraction.translated,
                },
                ProcessOutcome::Done,
            ),
            Err(e) => {
                warn!(item_id = %id, error = %e, "Extraction failed");
                (
                    StatusUpdate::Error { submission: number },
                    ProcessOutcome::Failed(e.to_string()),
                )
            }
        };

        match self.store.update_status(&id, update) {
            UpdateOutcome::Applied { .. } => {
                info!(item_id = %id, submission = number, outcome = ?outcome, "Item processed");
                outcome
            }
            UpdateOutcome::Missing => {
                debug!(item_id = %id, "Item removed before its result arrived");
                ProcessOutcome::Discarded
            }
            UpdateOutcome::Stale => {
                debug!(item_id = %id, submission = number, "Result superseded by a newer submission");
                ProcessOutcome::Discarded
            }
            other => {
                warn!(item_id = %id, outcome = ?other, "Result could not be applied");
                ProcessOutcome::Discarded
            }
        }
    }

    /// Starts one independent task per item currently in the store. Nothing
    /// waits for anything else; results land in whatever order they arrive.
    /// Every item is already `processing` when this returns.
    pub fn process_all(&self) -> Dispatch {
        let ids = self.store.ids();
        info!(count = ids.len(), "Dispatching all items");

        let tasks = ids
            .into_iter()
            .map(|id| (id, self.spawn_item(id)))
            .collect();

        Dispatch { tasks }
    }

    /// Starts processing of a single item without waiting for the result.
    /// The item is `processing` by the time this returns.
    pub fn spawn_item(&self, id: ItemId) -> JoinHandle<ProcessOutcome> {
        match self.begin(id) {
            Ok(submission) => {
                let controller = self.clone();
                tokio::spawn(async move { controller.finish(submission).await })
            }
            Err(outcome) => tokio::spawn(async move { outcome }),
        }
    }
}

/// A started submission waiting on its extraction result.
struct Submission {
    id: ItemId,
    number: u64,
    source: SourceFile,
    language: Language,
}

/// Tasks started by [`ProcessingController::process_all`]. Dropping it leaves
/// the tasks running.
#[derive(Debug)]
pub struct Dispatch {
    tasks: Vec<(ItemId, JoinHandle<ProcessOutcome>)>,
}

impl Dispatch {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.tasks.iter().map(|(id, _)| *id).collect()
    }

    /// Waits for every task and returns the outcomes in dispatch order.
    pub async fn join(self) -> Vec<(ItemId, ProcessOutcome)> {
        let (ids, handles): (Vec<_>, Vec<_>) = self.tasks.into_iter().unzip();
        let results = join_all(handles).await;

        ids.into_iter()
            .zip(results)
            .map(|(id, joined)| {
                let outcome = joined.unwrap_or_else(|e| {
                    warn!(item_id = %id, error = %e, "Processing task did not complete");
                    ProcessOutcome::Failed(format!("Processing task panicked: {e}"))
                });
                (id, outcome)
            })
            .collect()
    }
}
