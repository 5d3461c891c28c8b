use crate::date_key::DateKey;
use crate::entry::{Draft, JournalEntry};
use crate::error::StoreError;
use crate::record_store::RecordStore;
use crate::storage::Storage;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState<D> {
    Closed,
    Open { date: DateKey, draft: D, dirty: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Stored,
    /// The draft held nothing, so the date was taken out of the store.
    Removed,
    /// The draft held nothing and nothing was stored for the date.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    NothingToDelete,
}

pub struct Editor<E: JournalEntry> {
    state: EditorState<E::Draft>,
}

impl<E: JournalEntry> Default for Editor<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: JournalEntry> Editor<E> {
    pub fn new() -> Self {
        Editor {
            state: EditorState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open { .. })
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, EditorState::Open { dirty: true, .. })
    }

    pub fn date(&self) -> Option<DateKey> {
        match &self.state {
            EditorState::Open { date, .. } => Some(*date),
            EditorState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&E::Draft> {
        match &self.state {
            EditorState::Open { draft, .. } => Some(draft),
            EditorState::Closed => None,
        }
    }

    pub fn open<S: Storage>(&mut self, date: DateKey, store: &RecordStore<E, S>) {
        let draft = E::Draft::open(date, store.get(date));
        debug!(%date, "editor opened");
        self.state = EditorState::Open {
            date,
            draft,
            dirty: false,
        };
    }

    /// Applies `change` to the open draft and marks it dirty. Returns `None`
    /// when the editor is closed.
    pub fn edit<R>(&mut self, change: impl FnOnce(&mut E::Draft) -> R) -> Option<R> {
        match &mut self.state {
            EditorState::Open { draft, dirty, .. } => {
                *dirty = true;
                Some(change(draft))
            }
            EditorState::Closed => None,
        }
    }

    /// Merges the draft into the store and closes. On a storage error the
    /// editor stays open with its draft.
    pub fn save<S: Storage>(
        &mut self,
        store: &mut RecordStore<E, S>,
    ) -> Result<Option<SaveOutcome>, StoreError> {
        let EditorState::Open { date, draft, .. } = &self.state else {
            return Ok(None);
        };
        let date = *date;
        let outcome = match draft.clone().commit(date) {
            Some(entity) => {
                store.upsert(entity)?;
                SaveOutcome::Stored
            }
            None if store.get(date).is_some() => {
                store.remove(date)?;
                SaveOutcome::Removed
            }
            None => SaveOutcome::Discarded,
        };
        info!(%date, ?outcome, "editor saved");
        self.state = EditorState::Closed;
        Ok(Some(outcome))
    }

    pub fn close(&mut self) {
        if let Some(date) = self.date() {
            debug!(%date, dirty = self.is_dirty(), "editor closed without saving");
        }
        self.state = EditorState::Closed;
    }

    /// Removes everything stored for the open date once `confirm` agrees.
    /// A declined prompt keeps the editor open with its draft.
    pub fn delete<S: Storage>(
        &mut self,
        store: &mut RecordStore<E, S>,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<DeleteOutcome, StoreError> {
        let Some(date) = self.date() else {
            return Ok(DeleteOutcome::NothingToDelete);
        };
        if store.get(date).is_none() {
            return Ok(DeleteOutcome::NothingToDelete);
        }
        if !confirm(E::DELETE_PROMPT) {
            return Ok(DeleteOutcome::Declined);
        }
        store.remove(date)?;
        info!(%date, "deleted every record for date");
        self.state = EditorState::Closed;
        Ok(DeleteOutcome::Deleted)
    }
}
