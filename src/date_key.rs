use crate::error::DateKeyError;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Formats a date as its canonical key string.
pub fn format_date(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// The calendar day as seen in `dt`'s own offset, never converted to UTC.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        DateKey(dt.date_naive())
    }

    /// Builds a key from a year, a 0-based month index and a day of month.
    ///
    /// Out-of-range months and days roll over into neighbouring months, so
    /// `(2025, -1, 1)` is `2024-12-01` and `(2025, 2, 0)` is `2025-02-28`.
    pub fn from_calendar(year: i32, month0: i32, day: i32) -> Result<Self, DateKeyError> {
        let out_of_range = || DateKeyError::OutOfRange { year, month0, day };
        let year_shift = month0.div_euclid(12);
        let month = month0.rem_euclid(12) as u32 + 1;
        let first = year
            .checked_add(year_shift)
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, 1))
            .ok_or_else(out_of_range)?;
        first
            .checked_add_signed(Duration::days(i64::from(day) - 1))
            .map(DateKey)
            .ok_or_else(out_of_range)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 0-based month index.
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn succ_days(&self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(Duration::days(days)).map(DateKey)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, KEY_FORMAT)
            .map_err(|_| DateKeyError::Invalid(s.to_string()))?;
        // chrono accepts `2025-1-5`; only the zero-padded spelling is a key.
        if format_date(date) != s {
            return Err(DateKeyError::Invalid(s.to_string()));
        }
        Ok(DateKey(date))
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use std::collections::HashSet;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn key_uses_local_fields_not_utc() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let just_after_midnight = tokyo.with_ymd_and_hms(2025, 2, 1, 0, 30, 0).unwrap();

        assert_eq!(
            DateKey::from_datetime(&just_after_midnight).to_string(),
            "2025-02-01"
        );
        assert_eq!(
            DateKey::from_datetime(&just_after_midnight.with_timezone(&Utc)).to_string(),
            "2025-01-31"
        );
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_date(ymd(2025, 1, 5)), "2025-01-05");
        assert_eq!(DateKey::new(ymd(987, 12, 31)).to_string(), "0987-12-31");
    }

    #[test]
    fn distinct_dates_never_collide() {
        let start = ymd(2023, 1, 1);
        let keys: HashSet<String> = (0..1200)
            .map(|offset| format_date(start + Duration::days(offset)))
            .collect();
        assert_eq!(keys.len(), 1200);
    }

    #[test]
    fn same_date_always_same_key() {
        let date = ymd(2024, 2, 29);
        assert_eq!(format_date(date), format_date(date));
        assert_eq!(DateKey::new(date), "2024-02-29".parse().unwrap());
    }

    #[test]
    fn calendar_fields_roll_over() {
        assert_eq!(
            DateKey::from_calendar(2025, -1, 1).unwrap().to_string(),
            "2024-12-01"
        );
        assert_eq!(
            DateKey::from_calendar(2025, 2, 0).unwrap().to_string(),
            "2025-02-28"
        );
        assert_eq!(
            DateKey::from_calendar(2024, 11, 32).unwrap().to_string(),
            "2025-01-01"
        );
        assert_eq!(
            DateKey::from_calendar(2025, 0, -2).unwrap().to_string(),
            "2024-12-29"
        );
    }

    #[test]
    fn rejects_non_canonical_strings() {
        assert!("2025-1-5".parse::<DateKey>().is_err());
        assert!("2025-02-30".parse::<DateKey>().is_err());
        assert!("20250105".parse::<DateKey>().is_err());
        assert!("".parse::<DateKey>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let key: DateKey = "2025-01-20".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-01-20\"");
        let back: DateKey = serde_json::from_str("\"2025-01-20\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<DateKey>("\"2025/01/20\"").is_err());
    }
}
