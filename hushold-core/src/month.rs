//! Calendar months as grouping keys.
//!
//! `MonthKey` serializes as zero-padded `YYYY-MM`, so its text form sorts
//! the same way as its chronological order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HusholdError, Result};

/// A (year, month) pair with month in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(HusholdError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by `n` calendar months (negative moves backwards), rolling
    /// over year boundaries.
    pub fn add_months(self, n: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + n;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn succ(self) -> Self {
        self.add_months(1)
    }

    pub fn pred(self) -> Self {
        self.add_months(-1)
    }

    /// January through December of `year`.
    pub fn months_of_year(year: i32) -> impl Iterator<Item = MonthKey> {
        (1..=12).map(move |month| MonthKey { year, month })
    }

    /// Every month from `start` to `end`, both inclusive. Empty when
    /// `start > end`.
    pub fn range_inclusive(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
        let mut out = Vec::new();
        let mut cur = start;
        while cur <= end {
            out.push(cur);
            cur = cur.succ();
        }
        out
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = HusholdError;

    /// Accepts `YYYY-MM`, and also a full `YYYY-MM-DD` date whose day is
    /// ignored (some forecast services stamp points with the first day of
    /// the month).
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || HusholdError::InvalidMonthKey(s.to_string());

        let mut parts = text.splitn(3, '-');
        let year = parts.next().ok_or_else(invalid)?;
        let month = parts.next().ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if let Some(day) = parts.next() {
            let digits = day.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits != 2 {
                return Err(invalid());
            }
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolve the calendar date of `now` as seen in the IANA timezone `tz`.
///
/// Only callers that read the wall clock need this; everything in the
/// engine takes the reference date as an argument.
pub fn reference_date_in(tz: &str, now: DateTime<Utc>) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| HusholdError::InvalidTimezone(tz.to_string()))?;
    Ok(now.with_timezone(&tz).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_is_zero_padded() {
        let key = MonthKey::new(2024, 3).unwrap();
        assert_eq!(key.to_string(), "2024-03");
    }

    #[test]
    fn test_new_rejects_out_of_range_month() {
        assert_eq!(MonthKey::new(2024, 0), Err(HusholdError::InvalidMonth(0)));
        assert_eq!(MonthKey::new(2024, 13), Err(HusholdError::InvalidMonth(13)));
    }

    #[test]
    fn test_text_order_matches_chronological_order() {
        let mut keys = vec![
            MonthKey::new(2024, 10).unwrap(),
            MonthKey::new(2023, 12).unwrap(),
            MonthKey::new(2024, 2).unwrap(),
        ];
        let mut texts: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        keys.sort();
        texts.sort();
        let sorted: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(sorted, texts);
    }

    #[test]
    fn test_add_months_crosses_year_boundaries() {
        let nov = MonthKey::new(2024, 11).unwrap();
        assert_eq!(nov.add_months(3), MonthKey::new(2025, 2).unwrap());
        assert_eq!(nov.add_months(-11), MonthKey::new(2023, 12).unwrap());
        assert_eq!(MonthKey::new(2025, 1).unwrap().pred(), MonthKey::new(2024, 12).unwrap());
    }

    #[test]
    fn test_parse_accepts_month_and_date_forms() {
        assert_eq!("2025-07".parse::<MonthKey>().unwrap(), MonthKey::new(2025, 7).unwrap());
        assert_eq!("2025-07-01".parse::<MonthKey>().unwrap(), MonthKey::new(2025, 7).unwrap());
        assert!("2025-7".parse::<MonthKey>().is_err());
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("july".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_serde_uses_text_form() {
        let key = MonthKey::new(2026, 1).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2026-01\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_range_inclusive() {
        let start = MonthKey::new(2024, 11).unwrap();
        let end = MonthKey::new(2025, 2).unwrap();
        let range = MonthKey::range_inclusive(start, end);
        assert_eq!(range.len(), 4);
        assert_eq!(range[3], end);
        assert!(MonthKey::range_inclusive(end, start).is_empty());
    }

    #[test]
    fn test_reference_date_in_timezone() {
        // 23:30 UTC on Jan 31 is already Feb 1 in Oslo (UTC+1).
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 23, 30, 0).unwrap();
        let oslo = reference_date_in("Europe/Oslo", now).unwrap();
        assert_eq!(oslo, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        let utc = reference_date_in("UTC", now).unwrap();
        assert_eq!(utc, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert!(reference_date_in("Mars/Base", now).is_err());
    }
}
