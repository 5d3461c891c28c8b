use crate::date_key::DateKey;
use crate::error::ExportError;
use crate::export::ExportFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub trait JournalEntry: Clone + Debug + Serialize + DeserializeOwned {
    /// Editor-local copy of whatever is stored for one date.
    type Draft: Draft<Entry = Self>;

    const STORAGE_KEY: &'static str;
    const TITLE: &'static str;
    const DELETE_PROMPT: &'static str;

    fn date(&self) -> DateKey;

    fn preview(&self) -> String;

    /// `needle` is already trimmed and lowercased.
    fn matches(&self, needle: &str) -> bool;

    fn is_blank(&self) -> bool;

    /// Decodes one element of the persisted array, or `None` when it is
    /// unusable and should be skipped.
    fn from_persisted(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Serializes `entries`, already in date order, into a downloadable file.
    fn export(entries: &[&Self], today: DateKey) -> Result<ExportFile, ExportError>;
}

pub trait Draft: Clone + Debug {
    type Entry;

    fn open(date: DateKey, existing: Option<&Self::Entry>) -> Self;

    /// Turns the draft into the entity to store. `None` means the date
    /// should not be in the store at all.
    fn commit(self, date: DateKey) -> Option<Self::Entry>;
}
