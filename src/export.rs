use crate::date_key::DateKey;
use crate::diary_entry::DiaryEntry;
use crate::error::ExportError;
use crate::interview::InterviewData;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Lets spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADER: [&str; 6] = ["日付", "氏名", "学年", "学生所属", "面談カテゴリー", "本文"];

const TEXT_TITLE: &str = "日記データ";
const TEXT_DATE_LABEL: &str = "【日付】";
const TEXT_CONTENT_LABEL: &str = "【内容】";
const TEXT_SEPARATOR: &str = "--------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl ExportFile {
    /// Writes the file into `dir` and returns its full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        fs::create_dir_all(dir)
            .and_then(|_| fs::write(&path, &self.contents))
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), bytes = self.contents.len(), "export written");
        Ok(path)
    }
}

/// One labelled block per entry, in the order given.
pub fn diary_text(entries: &[&DiaryEntry], today: DateKey) -> Result<ExportFile, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut out = format!("{TEXT_TITLE}\n\n");
    for entry in entries {
        out.push_str(&format!("{TEXT_DATE_LABEL}: {}\n", entry.date));
        out.push_str(&format!("{TEXT_CONTENT_LABEL}:\n{}\n\n", entry.content));
        out.push_str(&format!("{TEXT_SEPARATOR}\n\n"));
    }

    Ok(ExportFile {
        file_name: format!("diary_{today}.txt"),
        contents: out.into_bytes(),
    })
}

/// One row per record, repeating the date; days in the order given, records
/// in stored order.
pub fn interview_csv(data: &[&InterviewData], today: DateKey) -> Result<ExportFile, ExportError> {
    if data.iter().all(|d| d.records.is_empty()) {
        return Err(ExportError::NothingToExport);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(UTF8_BOM.to_vec());
    writer.write_record(CSV_HEADER)?;
    for day in data {
        let date = day.date.to_string();
        for record in &day.records {
            writer.write_record([
                date.as_str(),
                record.student_name.as_str(),
                record.student_grade.as_str(),
                record.student_department.as_str(),
                record.category.as_str(),
                record.content.as_str(),
            ])?;
        }
    }
    let contents = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;

    Ok(ExportFile {
        file_name: format!("mendan_kiroku_{today}.csv"),
        contents,
    })
}
