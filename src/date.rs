//! Bucket date strings and the injectable "today" clock.

use chrono::{Datelike, Local, NaiveDate};

/// Formats a date as a bucket key: `YYYY-M-D`, no zero padding.
pub fn bucket_key(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// Parses a bucket key back into a date.
///
/// Only the canonical form produced by [`bucket_key`] is accepted, so every
/// date maps to exactly one bucket directory.
pub fn parse_bucket_key(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    (bucket_key(date) == s).then_some(date)
}

/// Source of the current calendar day.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen on one day, for scripted use and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[test]
fn test_bucket_key_is_not_padded() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    assert_eq!(bucket_key(date), "2024-1-5");
    assert_eq!(parse_bucket_key("2024-1-5"), Some(date));
}

#[test]
fn test_parse_bucket_key_rejects_non_buckets() {
    assert_eq!(parse_bucket_key("id"), None);
    assert_eq!(parse_bucket_key("2024-2-30"), None);
    assert_eq!(parse_bucket_key("2024-01-05"), None);
    assert_eq!(parse_bucket_key("2024-1"), None);
    assert_eq!(parse_bucket_key("2024-1-5-1"), None);
}
