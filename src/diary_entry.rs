use crate::date_key::DateKey;
use crate::entry::{Draft, JournalEntry};
use crate::error::ExportError;
use crate::export::{self, ExportFile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub date: DateKey,
    pub content: String,
}

impl DiaryEntry {
    pub fn new(date: DateKey, content: impl Into<String>) -> Self {
        DiaryEntry {
            date,
            content: content.into(),
        }
    }
}

impl JournalEntry for DiaryEntry {
    type Draft = DiaryDraft;

    const STORAGE_KEY: &'static str = "diaries";
    const TITLE: &'static str = "Diary";
    const DELETE_PROMPT: &'static str = "Delete the diary entry for this day?";

    fn date(&self) -> DateKey {
        self.date
    }

    fn preview(&self) -> String {
        self.content.lines().next().unwrap_or("").to_string()
    }

    fn matches(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
    }

    fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    fn export(entries: &[&Self], today: DateKey) -> Result<ExportFile, ExportError> {
        export::diary_text(entries, today)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryDraft {
    pub content: String,
}

impl Draft for DiaryDraft {
    type Entry = DiaryEntry;

    fn open(_date: DateKey, existing: Option<&DiaryEntry>) -> Self {
        DiaryDraft {
            content: existing.map(|e| e.content.clone()).unwrap_or_default(),
        }
    }

    fn commit(self, date: DateKey) -> Option<DiaryEntry> {
        if self.content.trim().is_empty() {
            None
        } else {
            Some(DiaryEntry::new(date, self.content))
        }
    }
}
