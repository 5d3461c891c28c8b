use crate::date_key::DateKey;
use crate::entry::JournalEntry;
use crate::record_store::RecordStore;
use crate::storage::Storage;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Six weeks of seven days.
pub const GRID_CELLS: usize = 42;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Keeps the 42-day window around any displayed month representable.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;
const YEAR_SPAN: i32 = 10;

/// The displayed year and 0-based month; the only navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    year: i32,
    month0: u32,
}

impl MonthView {
    pub fn new(year: i32, month0: u32) -> Self {
        MonthView {
            year: year.clamp(MIN_YEAR, MAX_YEAR),
            month0: month0.min(11),
        }
    }

    pub fn containing(date: DateKey) -> Self {
        Self::new(date.year(), date.month0())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }

    pub fn prev_month(self) -> Self {
        if self.month0 == 0 {
            Self::new(self.year - 1, 11)
        } else {
            Self::new(self.year, self.month0 - 1)
        }
    }

    pub fn next_month(self) -> Self {
        if self.month0 == 11 {
            Self::new(self.year + 1, 0)
        } else {
            Self::new(self.year, self.month0 + 1)
        }
    }

    pub fn with_year(self, year: i32) -> Self {
        Self::new(year, self.month0)
    }

    pub fn with_month(self, month0: u32) -> Self {
        Self::new(self.year, month0)
    }

    pub fn year_options(&self) -> RangeInclusive<i32> {
        (self.year - YEAR_SPAN).max(MIN_YEAR)..=(self.year + YEAR_SPAN).min(MAX_YEAR)
    }

    pub fn contains(&self, date: DateKey) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }

    fn first_day(&self) -> NaiveDate {
        // Year is clamped and month0 < 12, so day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap_or_default()
    }

    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        let next = self.next_month().first_day();
        if next > first {
            (next - first).num_days() as u32
        } else {
            // December of the last supported year.
            31
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: DateKey,
    pub in_month: bool,
    pub is_today: bool,
    pub preview: Option<String>,
    pub highlighted: bool,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Builds the 42 cells for `view`: trailing days of the previous month,
/// every day of the month, then leading days of the next month.
///
/// Only days of the displayed month are annotated; neighbouring days are
/// plain but still selectable.
pub fn build_grid<E: JournalEntry, S: Storage>(
    view: MonthView,
    today: DateKey,
    store: &RecordStore<E, S>,
    highlights: &BTreeSet<DateKey>,
) -> Vec<DayCell> {
    let first = view.first_day();
    let leading = i64::from(first.weekday().num_days_from_sunday());
    let start = first - Duration::days(leading);

    start
        .iter_days()
        .take(GRID_CELLS)
        .map(DateKey::new)
        .map(|date| {
            if view.contains(date) {
                DayCell {
                    date,
                    in_month: true,
                    is_today: date == today,
                    preview: store.get(date).map(|e| e.preview()),
                    highlighted: highlights.contains(&date),
                }
            } else {
                DayCell {
                    date,
                    in_month: false,
                    is_today: false,
                    preview: None,
                    highlighted: false,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary_entry::DiaryEntry;
    use crate::storage::MemoryStorage;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn empty_store() -> RecordStore<DiaryEntry, MemoryStorage> {
        RecordStore::new(MemoryStorage::new())
    }

    #[test]
    fn always_forty_two_cells() {
        let store = empty_store();
        for year in [1, 1999, 2000, 2024, 2025, 9999] {
            for month0 in 0..12 {
                let grid = build_grid(
                    MonthView::new(year, month0),
                    key("2025-01-01"),
                    &store,
                    &BTreeSet::new(),
                );
                assert_eq!(grid.len(), GRID_CELLS, "{year}-{month0}");
            }
        }
    }

    #[test]
    fn leading_and_trailing_days_come_from_neighbours() {
        // 2025-01-01 is a Wednesday: three leading days from December.
        let grid = build_grid(
            MonthView::new(2025, 0),
            key("2025-01-01"),
            &empty_store(),
            &BTreeSet::new(),
        );
        let leading: Vec<String> = grid[..3].iter().map(|c| c.date.to_string()).collect();
        assert_eq!(leading, ["2024-12-29", "2024-12-30", "2024-12-31"]);
        assert!(grid[..3].iter().all(|c| !c.in_month));
        assert_eq!(grid[3].date, key("2025-01-01"));
        assert_eq!(grid[33].date, key("2025-01-31"));
        assert_eq!(grid[34].date, key("2025-02-01"));
        assert_eq!(grid[41].date, key("2025-02-08"));
        assert_eq!(grid.iter().filter(|c| c.in_month).count(), 31);
    }

    #[test]
    fn month_starting_on_sunday_has_no_leading_days() {
        // 2025-06-01 is a Sunday.
        let grid = build_grid(
            MonthView::new(2025, 5),
            key("2025-01-01"),
            &empty_store(),
            &BTreeSet::new(),
        );
        assert_eq!(grid[0].date, key("2025-06-01"));
        assert!(grid[0].in_month);
    }

    #[test]
    fn exactly_one_today_inside_displayed_month() {
        let store = empty_store();
        let today = key("2025-01-15");
        let grid = build_grid(MonthView::new(2025, 0), today, &store, &BTreeSet::new());
        let todays: Vec<&DayCell> = grid.iter().filter(|c| c.is_today).collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].date, today);

        let other = build_grid(MonthView::new(2025, 1), today, &store, &BTreeSet::new());
        assert_eq!(other.iter().filter(|c| c.is_today).count(), 0);
    }

    #[test]
    fn today_in_neighbouring_spill_is_not_flagged() {
        // 2025-02-01 appears as a trailing cell of January.
        let grid = build_grid(
            MonthView::new(2025, 0),
            key("2025-02-01"),
            &empty_store(),
            &BTreeSet::new(),
        );
        assert!(grid.iter().all(|c| !c.is_today));
    }

    #[test]
    fn previews_and_highlights_follow_store() {
        let mut store = empty_store();
        store
            .upsert(DiaryEntry::new(key("2025-01-05"), "Skating\nwith friends"))
            .unwrap();
        store
            .upsert(DiaryEntry::new(key("2025-01-20"), "Quiet day"))
            .unwrap();
        let highlights = store.search("skating");

        let grid = build_grid(MonthView::new(2025, 0), key("2025-01-01"), &store, &highlights);
        let highlighted: Vec<DateKey> =
            grid.iter().filter(|c| c.highlighted).map(|c| c.date).collect();
        assert_eq!(highlighted, [key("2025-01-05")]);

        let cell = grid.iter().find(|c| c.date == key("2025-01-05")).unwrap();
        assert_eq!(cell.preview.as_deref(), Some("Skating"));
        let cell = grid.iter().find(|c| c.date == key("2025-01-20")).unwrap();
        assert_eq!(cell.preview.as_deref(), Some("Quiet day"));
        assert!(!cell.highlighted);
    }

    #[test]
    fn navigation_wraps_years() {
        let view = MonthView::new(2025, 0);
        assert_eq!(view.prev_month(), MonthView::new(2024, 11));
        assert_eq!(MonthView::new(2024, 11).next_month(), view);
        assert_eq!(view.with_month(6).month0(), 6);
        assert_eq!(view.with_year(2030).year(), 2030);
        assert_eq!(MonthView::containing(key("2024-02-10")), MonthView::new(2024, 1));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(MonthView::new(2024, 1).days_in_month(), 29);
        assert_eq!(MonthView::new(2025, 1).days_in_month(), 28);
        assert_eq!(MonthView::new(1900, 1).days_in_month(), 28);
        assert_eq!(MonthView::new(2000, 1).days_in_month(), 29);
        assert_eq!(MonthView::new(2025, 11).days_in_month(), 31);
    }

    #[test]
    fn year_options_span_ten_years_each_way() {
        let options = MonthView::new(2025, 3).year_options();
        assert_eq!(*options.start(), 2015);
        assert_eq!(*options.end(), 2035);
    }
}
