use crate::date_key::DateKey;
use crate::entry::JournalEntry;
use crate::error::StoreError;
use crate::storage::Storage;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Ordered, date-keyed collection of journal entities. Every mutation
/// rewrites the whole collection; the last write wins.
pub struct RecordStore<E, S> {
    entries: Vec<E>,
    storage: S,
}

impl<E: JournalEntry, S: Storage> RecordStore<E, S> {
    pub fn new(storage: S) -> Self {
        RecordStore {
            entries: Vec::new(),
            storage,
        }
    }

    /// Reads the persisted collection, skipping elements that cannot be used.
    pub fn load(storage: S) -> Result<Self, StoreError> {
        let Some(serialized) = storage.read(E::STORAGE_KEY)? else {
            info!(key = E::STORAGE_KEY, "no persisted data; starting empty");
            return Ok(Self::new(storage));
        };

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&serialized).map_err(|source| StoreError::Decode {
                key: E::STORAGE_KEY,
                source,
            })?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            let Some(entity) = E::from_persisted(value) else {
                warn!(key = E::STORAGE_KEY, index, "skipping unreadable entry");
                continue;
            };
            if entity.is_blank() {
                debug!(date = %entity.date(), "dropping blank entry");
                continue;
            }
            if !seen.insert(entity.date()) {
                warn!(date = %entity.date(), "duplicate date in persisted data; keeping the first");
                continue;
            }
            entries.push(entity);
        }

        info!(key = E::STORAGE_KEY, count = entries.len(), "loaded store");
        Ok(RecordStore { entries, storage })
    }

    pub fn get(&self, date: DateKey) -> Option<&E> {
        self.entries.iter().find(|e| e.date() == date)
    }

    /// Replaces the entity for its date in place, or appends it.
    pub fn upsert(&mut self, entity: E) -> Result<(), StoreError> {
        let date = entity.date();
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|e| e.date() == date) {
            Some(existing) => *existing = entity,
            None => entries.push(entity),
        }
        self.commit(entries)?;
        debug!(%date, "upserted entry");
        Ok(())
    }

    pub fn remove(&mut self, date: DateKey) -> Result<bool, StoreError> {
        if self.get(date).is_none() {
            return Ok(false);
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.date() != date)
            .cloned()
            .collect();
        self.commit(entries)?;
        debug!(%date, "removed entry");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        info!(key = E::STORAGE_KEY, count = self.entries.len(), "clearing store");
        self.commit(Vec::new())
    }

    pub fn list_all(&self) -> &[E] {
        &self.entries
    }

    pub fn sorted(&self) -> Vec<&E> {
        let mut sorted: Vec<&E> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.date());
        sorted
    }

    /// Dates whose entity contains `query`, ignoring case. A blank query
    /// matches nothing.
    pub fn search(&self, query: &str) -> BTreeSet<DateKey> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return BTreeSet::new();
        }
        self.entries
            .iter()
            .filter(|e| e.matches(&needle))
            .map(|e| e.date())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes `entries` out and adopts them only once storage accepted them.
    fn commit(&mut self, entries: Vec<E>) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&entries).map_err(|source| StoreError::Encode {
            key: E::STORAGE_KEY,
            source,
        })?;
        self.storage.write(E::STORAGE_KEY, &serialized)?;
        self.entries = entries;
        Ok(())
    }
}
