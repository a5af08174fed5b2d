//! Ordered collection of uploaded items plus the current selection.
//!
//! All mutation goes through `&self` methods that take the lock for the
//! duration of a single by-id change and never across an `.await`, so
//! concurrently finishing extractions cannot clobber each other's items.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Pic2TextError, Result};
use crate::models::{
    ItemId, ItemSnapshot, ItemStatus, OcrItem, PreviewRegistry, SourceFile,
};

/// A status change requested by the processing controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Start (or restart) a submission. With `exclusive` set, an item that is
    /// already processing is left alone.
    Processing { exclusive: bool },
    Done {
        submission: u64,
        original_text: String,
        translated_text: String,
    },
    Error { submission: u64 },
}

impl StatusUpdate {
    fn target(&self) -> ItemStatus {
        match self {
            Self::Processing { .. } => ItemStatus::Processing,
            Self::Done { .. } => ItemStatus::Done,
            Self::Error { .. } => ItemStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied { submission: u64 },
    /// No item with that id (removed or never existed).
    Missing,
    /// A newer submission has started since this result was requested.
    Stale,
    /// Exclusive start refused because a submission is in flight.
    Busy,
    InvalidTransition { from: ItemStatus, to: ItemStatus },
}

#[derive(Debug, Default)]
struct StoreState {
    items: Vec<OcrItem>,
    selected: Option<ItemId>,
}

#[derive(Debug)]
pub struct ItemStore {
    state: RwLock<StoreState>,
    previews: Arc<PreviewRegistry>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self::with_previews(PreviewRegistry::new())
    }

    pub fn with_previews(previews: Arc<PreviewRegistry>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            previews,
        }
    }

    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one pending item per file, in input order. Selects the first
    /// new item when nothing is selected yet.
    pub fn add<I>(&self, files: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let new_items: Vec<OcrItem> = files
            .into_iter()
            .map(|source| {
                let preview = self.previews.create(&source);
                OcrItem::new(source, preview)
            })
            .collect();

        if new_items.is_empty() {
            return Vec::new();
        }

        let ids: Vec<ItemId> = new_items.iter().map(|item| item.id).collect();

        let mut state = self.write();
        state.items.extend(new_items);
        if state.selected.is_none() {
            state.selected = ids.first().copied();
        }
        info!(added = ids.len(), total = state.items.len(), "Added items");

        ids
    }

    /// Removes the item and releases its preview. Returns whether anything
    /// was removed; removing an absent id is a no-op.
    pub fn remove(&self, id: &ItemId) -> bool {
        let removed = {
            let mut state = self.write();
            let Some(pos) = state.items.iter().position(|item| item.id == *id) else {
                return false;
            };
            if state.selected == Some(*id) {
                state.selected = None;
            }
            state.items.remove(pos)
        };

        debug!(item_id = %id, preview = %removed.preview.id(), "Removed item");
        drop(removed);
        true
    }

    /// Removes every item, releasing all previews, and clears the selection.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut state = self.write();
            state.selected = None;
            std::mem::take(&mut state.items)
        };

        let count = removed.len();
        drop(removed);
        info!(removed = count, "Cleared items");
        count
    }

    /// Selects an item from the current collection. Absent ids are refused
    /// and leave the selection unchanged.
    pub fn select(&self, id: &ItemId) -> Result<()> {
        let mut state = self.write();
        if !state.items.iter().any(|item| item.id == *id) {
            return Err(Pic2TextError::NotFound(format!("Item {id} not found")));
        }
        state.selected = Some(*id);
        Ok(())
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        self.read().selected
    }

    pub fn selected(&self) -> Option<ItemSnapshot> {
        let state = self.read();
        let id = state.selected?;
        state
            .items
            .iter()
            .find(|item| item.id == id)
            .map(OcrItem::snapshot)
    }

    pub fn get(&self, id: &ItemId) -> Option<ItemSnapshot> {
        self.read()
            .items
            .iter()
            .find(|item| item.id == *id)
            .map(OcrItem::snapshot)
    }

    pub fn source(&self, id: &ItemId) -> Option<SourceFile> {
        self.read()
            .items
            .iter()
            .find(|item| item.id == *id)
            .map(|item| item.source.clone())
    }

    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.read().items.iter().map(OcrItem::snapshot).collect()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.read().items.iter().map(|item| item.id).collect()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// The single write path for item status and text. The change is applied
    /// to one item, by id, under the lock.
    pub fn update_status(&self, id: &ItemId, update: StatusUpdate) -> UpdateOutcome {
        let mut state = self.write();
        let Some(item) = state.items.iter_mut().find(|item| item.id == *id) else {
            return UpdateOutcome::Missing;
        };

        let to = update.target();
        let from = item.status;

        match update {
            StatusUpdate::Processing { exclusive } => {
                if exclusive && from == ItemStatus::Processing {
                    return UpdateOutcome::Busy;
                }
                item.submission += 1;
                item.status = ItemStatus::Processing;
                item.original_text.clear();
                item.translated_text = Some(String::new());
            }
            StatusUpdate::Done {
                submission,
                original_text,
                translated_text,
            } => {
                if submission != item.submission {
                    return UpdateOutcome::Stale;
                }
                if !from.can_transition_to(to) {
                    return UpdateOutcome::InvalidTransition { from, to };
                }
                item.status = ItemStatus::Done;
                item.original_text = original_text;
                item.translated_text = Some(translated_text);
            }
            StatusUpdate::Error { submission } => {
                if submission != item.submission {
                    return UpdateOutcome::Stale;
                }
                if !from.can_transition_to(to) {
                    return UpdateOutcome::InvalidTransition { from, to };
                }
                item.status = ItemStatus::Error;
                item.original_text.clear();
                item.translated_text = None;
            }
        }

        item.updated_at = Utc::now();
        debug!(item_id = %id, %from, %to, submission = item.submission, "Item status updated");
        UpdateOutcome::Applied {
            submission: item.submission,
        }
    }
}
