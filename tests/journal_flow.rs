use calendar_journal::app::{App, Overlay};
use calendar_journal::calendar::{build_grid, MonthView, GRID_CELLS};
use calendar_journal::editor::{Editor, SaveOutcome};
use calendar_journal::export::UTF8_BOM;
use calendar_journal::interview::RecordField;
use calendar_journal::storage::{FileStorage, Storage};
use calendar_journal::{DateKey, DiaryEntry, InterviewData, JournalEntry, RecordStore};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn key(s: &str) -> DateKey {
    s.parse().unwrap()
}

fn diary_store(dir: &TempDir) -> RecordStore<DiaryEntry, FileStorage> {
    RecordStore::load(FileStorage::new(dir.path()).unwrap()).unwrap()
}

fn interview_store(dir: &TempDir) -> RecordStore<InterviewData, FileStorage> {
    RecordStore::load(FileStorage::new(dir.path()).unwrap()).unwrap()
}

#[test]
fn diary_entry_survives_restart() {
    let dir = TempDir::new().unwrap();
    let date = key("2025-01-05");

    let mut store = diary_store(&dir);
    let mut editor: Editor<DiaryEntry> = Editor::new();
    editor.open(date, &store);
    editor.edit(|d| d.content = "New year walk\nCold but sunny".to_string());
    assert_eq!(editor.save(&mut store).unwrap(), Some(SaveOutcome::Stored));
    drop(store);

    let store = diary_store(&dir);
    editor.open(date, &store);
    assert_eq!(
        editor.draft().unwrap().content,
        "New year walk\nCold but sunny"
    );
}

#[test]
fn search_highlights_only_the_matching_day() {
    let dir = TempDir::new().unwrap();
    let mut store = diary_store(&dir);
    store
        .upsert(DiaryEntry::new(key("2025-01-05"), "Ski trip with family"))
        .unwrap();
    store
        .upsert(DiaryEntry::new(key("2025-01-20"), "Office party"))
        .unwrap();

    let highlights = store.search("ski");
    let grid = build_grid(
        MonthView::new(2025, 0),
        key("2025-01-10"),
        &store,
        &highlights,
    );

    assert_eq!(grid.len(), GRID_CELLS);
    let highlighted: Vec<DateKey> = grid
        .iter()
        .filter(|c| c.highlighted)
        .map(|c| c.date)
        .collect();
    assert_eq!(highlighted, [key("2025-01-05")]);
    assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);
}

#[test]
fn removed_interview_record_leaves_the_other_intact() {
    let dir = TempDir::new().unwrap();
    let date = key("2025-06-12");
    let mut store = interview_store(&dir);
    let mut editor: Editor<InterviewData> = Editor::new();

    editor.open(date, &store);
    let first = editor.draft().unwrap().records[0].id.clone();
    let second = editor.edit(|d| d.add_record()).unwrap();
    editor.edit(|d| {
        d.update(&first, RecordField::Name, "Takahashi");
        d.update(&second, RecordField::Name, "Watanabe");
        d.update(&second, RecordField::Content, "Essay draft, needs \"structure\"");
    });
    editor.save(&mut store).unwrap();

    editor.open(date, &store);
    editor.edit(|d| d.remove_record(&first));
    editor.save(&mut store).unwrap();
    drop(store);

    let store = interview_store(&dir);
    let records = &store.get(date).unwrap().records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, second);
    assert_eq!(records[0].student_name, "Watanabe");

    let raw = FileStorage::new(dir.path())
        .unwrap()
        .read("interviews")
        .unwrap()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["date"], "2025-06-12");
    assert_eq!(json[0]["records"][0]["studentName"], "Watanabe");
}

#[test]
fn blank_interview_draft_removes_the_date() {
    let dir = TempDir::new().unwrap();
    let date = key("2025-06-12");
    let mut store = interview_store(&dir);
    let mut editor: Editor<InterviewData> = Editor::new();

    editor.open(date, &store);
    let id = editor.draft().unwrap().records[0].id.clone();
    editor.edit(|d| d.update(&id, RecordField::Content, "Follow-up"));
    editor.save(&mut store).unwrap();
    assert!(store.get(date).is_some());

    editor.open(date, &store);
    editor.edit(|d| d.update(&id, RecordField::Content, ""));
    assert_eq!(editor.save(&mut store).unwrap(), Some(SaveOutcome::Removed));
    assert!(store.get(date).is_none());
    assert!(interview_store(&dir).is_empty());
}

#[test]
fn empty_store_export_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut app = App::new(
        interview_store(&dir),
        key("2025-07-01"),
        out.path().to_path_buf(),
    );

    app.export();

    assert_eq!(
        *app.overlay(),
        Overlay::Notice("There is nothing to export.".to_string())
    );
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn csv_export_round_trips_through_a_csv_reader() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut store = interview_store(&dir);
    let mut editor: Editor<InterviewData> = Editor::new();

    editor.open(key("2025-07-02"), &store);
    let id = editor.draft().unwrap().records[0].id.clone();
    editor.edit(|d| {
        d.update(&id, RecordField::Name, "Kobayashi");
        d.update(&id, RecordField::Content, "a,b\"c\nsecond line");
    });
    editor.save(&mut store).unwrap();

    let file = InterviewData::export(&store.sorted(), key("2025-07-03")).unwrap();
    let path = file.write_to(out.path()).unwrap();
    assert!(path.ends_with("mendan_kiroku_2025-07-03.csv"));

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "2025-07-02");
    assert_eq!(&rows[0][1], "Kobayashi");
    assert_eq!(&rows[0][5], "a,b\"c\nsecond line");
    assert_eq!(store.search("KOBAYASHI"), BTreeSet::from([key("2025-07-02")]));
}
