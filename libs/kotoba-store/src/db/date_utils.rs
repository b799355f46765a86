//! Date utilities for timestamps and daily reset hour handling.

use crate::db::error::DbError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};

/// Last year whose timestamps keep the fixed-width storage format.
pub const MAX_DB_YEAR: i32 = 9999;

/// Format a timestamp for storage.
///
/// Years outside 0..=9999 are rejected; their RFC 3339 form is signed and
/// does not sort as text.
pub fn to_db_time(time: DateTime<Utc>) -> Result<String, DbError> {
    if !(0..=MAX_DB_YEAR).contains(&time.year()) {
        return Err(DbError::InvalidData(format!(
            "timestamp {time} is outside the storable range"
        )));
    }
    Ok(time.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Parse a stored timestamp.
pub fn from_db_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Get the study day a moment belongs to.
///
/// Before `daily_reset_hour` (UTC) the study day is still "yesterday", so
/// late-night sessions count towards the previous day.
pub fn study_day(now: DateTime<Utc>, daily_reset_hour: u32) -> NaiveDate {
    (now - Duration::hours(i64::from(daily_reset_hour))).date_naive()
}

/// Format a study day as YYYY-MM-DD for SQL queries.
pub fn study_day_string(now: DateTime<Utc>, daily_reset_hour: u32) -> String {
    study_day(now, daily_reset_hour).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_midnight_reset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 30, 0).unwrap();
        assert_eq!(study_day(now, 0), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_before_reset_hour_is_yesterday() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();
        assert_eq!(study_day(now, 4), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(study_day(now, 3), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_format_string() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(study_day_string(now, 0), "2024-03-10");
    }

    #[test]
    fn test_db_time_round_trip_sorts() {
        let early = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let late = early + Duration::milliseconds(1500);
        assert!(to_db_time(early).unwrap() < to_db_time(late).unwrap());
        assert_eq!(from_db_time(&to_db_time(late).unwrap()), Some(late));
        assert_eq!(from_db_time("yesterday"), None);
    }

    #[test]
    fn test_db_time_rejects_years_past_9999() {
        let last = Utc.with_ymd_and_hms(MAX_DB_YEAR, 12, 31, 23, 59, 59).unwrap();
        let stored = to_db_time(last).unwrap();
        assert_eq!(from_db_time(&stored), Some(last));

        let beyond = last + Duration::seconds(1);
        assert!(matches!(to_db_time(beyond), Err(DbError::InvalidData(_))));
    }
}
