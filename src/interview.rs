use crate::date_key::DateKey;
use crate::entry::{Draft, JournalEntry};
use crate::error::ExportError;
use crate::export::{self, ExportFile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

pub const DEPARTMENT_OPTIONS: [&str; 9] = [
    "教育学部",
    "人文学部",
    "理学部",
    "工学部",
    "都市デザイン学部",
    "人文社会芸術総合研究科",
    "理工学研究科",
    "教職実践開発研究科",
    "その他",
];

pub const CATEGORY_OPTIONS: [&str; 5] = [
    "個人面談",
    "志願票指導",
    "小論文指導",
    "模擬授業",
    "集団論文",
];

pub const GRADE_OPTIONS: [&str; 7] = ["1", "2", "3", "4", "5", "6", "7"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_grade: String,
    #[serde(default)]
    pub student_department: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
}

impl InterviewRecord {
    pub fn blank() -> Self {
        InterviewRecord {
            id: Uuid::new_v4().to_string(),
            student_name: String::new(),
            student_grade: GRADE_OPTIONS[0].to_string(),
            student_department: DEPARTMENT_OPTIONS[0].to_string(),
            category: CATEGORY_OPTIONS[0].to_string(),
            content: String::new(),
        }
    }

    /// Rows without a name and without content are never stored.
    pub fn is_blank(&self) -> bool {
        self.student_name.trim().is_empty() && self.content.trim().is_empty()
    }

    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.student_name,
            RecordField::Grade => &self.student_grade,
            RecordField::Department => &self.student_department,
            RecordField::Category => &self.category,
            RecordField::Content => &self.content,
        }
    }

    pub fn field_mut(&mut self, field: RecordField) -> &mut String {
        match field {
            RecordField::Name => &mut self.student_name,
            RecordField::Grade => &mut self.student_grade,
            RecordField::Department => &mut self.student_department,
            RecordField::Category => &mut self.category,
            RecordField::Content => &mut self.content,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        [
            &self.student_name,
            &self.student_department,
            &self.category,
            &self.content,
        ]
        .iter()
        .any(|text| text.to_lowercase().contains(needle))
    }
}

/// The editable fields of a record, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Grade,
    Department,
    Category,
    Content,
}

impl RecordField {
    pub const ALL: [RecordField; 5] = [
        RecordField::Name,
        RecordField::Grade,
        RecordField::Department,
        RecordField::Category,
        RecordField::Content,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RecordField::Name => "Name",
            RecordField::Grade => "Grade",
            RecordField::Department => "Department",
            RecordField::Category => "Category",
            RecordField::Content => "Content",
        }
    }

    /// Fixed choices for select-style fields; `None` for free text.
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            RecordField::Grade => Some(&GRADE_OPTIONS[..]),
            RecordField::Department => Some(&DEPARTMENT_OPTIONS[..]),
            RecordField::Category => Some(&CATEGORY_OPTIONS[..]),
            RecordField::Name | RecordField::Content => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewData {
    pub date: DateKey,
    #[serde(default)]
    pub records: Vec<InterviewRecord>,
}

impl JournalEntry for InterviewData {
    type Draft = InterviewDraft;

    const STORAGE_KEY: &'static str = "interviews";
    const TITLE: &'static str = "Interview records";
    const DELETE_PROMPT: &'static str = "Delete every interview record for this day?";

    fn date(&self) -> DateKey {
        self.date
    }

    fn preview(&self) -> String {
        let names: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.student_name.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            format!("{} record(s)", self.records.len())
        } else {
            names.join(", ")
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.records.iter().any(|r| r.matches(needle))
    }

    fn is_blank(&self) -> bool {
        self.records.is_empty()
    }

    /// Accepts partially broken data: a missing or non-array `records`
    /// becomes an empty list, unreadable rows are dropped, and missing or
    /// duplicate ids are replaced so every row stays addressable.
    fn from_persisted(value: serde_json::Value) -> Option<Self> {
        let date: DateKey = value.get("date")?.as_str()?.parse().ok()?;
        let raw_records = match value.get("records") {
            Some(serde_json::Value::Array(items)) => items.clone(),
            _ => {
                warn!(%date, "interview data without a records array; treating as empty");
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let records = raw_records
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<InterviewRecord>(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(%date, error = %err, "skipping unreadable interview record");
                    None
                }
            })
            .map(|mut record| {
                if record.id.is_empty() || !seen.insert(record.id.clone()) {
                    record.id = Uuid::new_v4().to_string();
                    seen.insert(record.id.clone());
                }
                record
            })
            .collect();

        Some(InterviewData { date, records })
    }

    fn export(entries: &[&Self], today: DateKey) -> Result<ExportFile, ExportError> {
        export::interview_csv(entries, today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewDraft {
    pub records: Vec<InterviewRecord>,
}

impl InterviewDraft {
    /// Appends a blank row and returns its id.
    pub fn add_record(&mut self) -> String {
        let record = InterviewRecord::blank();
        let id = record.id.clone();
        self.records.push(record);
        id
    }

    pub fn remove_record(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn update(&mut self, id: &str, field: RecordField, value: impl Into<String>) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                *record.field_mut(field) = value.into();
                true
            }
            None => false,
        }
    }
}

impl Draft for InterviewDraft {
    type Entry = InterviewData;

    fn open(_date: DateKey, existing: Option<&InterviewData>) -> Self {
        let records = match existing {
            Some(data) if !data.records.is_empty() => data.records.clone(),
            _ => vec![InterviewRecord::blank()],
        };
        InterviewDraft { records }
    }

    fn commit(self, date: DateKey) -> Option<InterviewData> {
        let records: Vec<InterviewRecord> =
            self.records.into_iter().filter(|r| !r.is_blank()).collect();
        if records.is_empty() {
            None
        } else {
            Some(InterviewData { date, records })
        }
    }
}
