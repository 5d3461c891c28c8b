//! Calendar journal: a month-grid calendar with date-keyed diary entries or
//! interview records, persisted locally and exportable as text or CSV.

pub mod app;
pub mod calendar;
pub mod config;
pub mod date_key;
pub mod diary_entry;
pub mod editor;
pub mod entry;
pub mod error;
pub mod export;
pub mod form;
pub mod interview;
pub mod logging;
pub mod record_store;
pub mod storage;
pub mod ui;

pub use date_key::{format_date, DateKey};
pub use diary_entry::DiaryEntry;
pub use entry::{Draft, JournalEntry};
pub use interview::{InterviewData, InterviewRecord};
pub use record_store::RecordStore;
