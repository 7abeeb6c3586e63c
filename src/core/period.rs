//! Calendar month value type used to key monthly aggregates and derive windows.

use super::error::{AnalysisError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// A (year, month) pair with no day component.
///
/// Ordering is chronological. Every constructed value is guaranteed to map to
/// dates representable by [`NaiveDate`], so [`first_day`](Self::first_day) and
/// [`last_day`](Self::last_day) never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(AnalysisError::InvalidPeriod(format!(
                "month {month} is outside 1..=12"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AnalysisError::InvalidPeriod(format!(
                "year {year} is out of the supported date range"
            )));
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

    /// Moves the period by `months` calendar months (negative goes back).
    pub fn shift(&self, months: i32) -> Result<Self> {
        let index = self.index() + i64::from(months);
        let year = i32::try_from(index.div_euclid(12))
            .map_err(|_| AnalysisError::InvalidPeriod(format!("{self} shifted by {months}")))?;
        let month = index.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("YearMonth is validated on construction")
    }

    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days_in_month())
            .expect("YearMonth is validated on construction")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AnalysisError;

    /// Accepts `YYYY-MM` and `MM/YYYY`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || AnalysisError::InvalidPeriod(format!("cannot parse '{s}' as YYYY-MM"));

        let (year, month) = if let Some((month, year)) = s.split_once('/') {
            (year, month)
        } else if let Some((year, month)) = s.split_once('-') {
            (year, month)
        } else {
            return Err(invalid());
        };

        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(YearMonth::new(2024, 0).is_err());
        assert!(YearMonth::new(2024, 13).is_err());
    }

    #[test]
    fn test_shift_across_year_boundaries() {
        assert_eq!(ym(2024, 3).shift(-2).unwrap(), ym(2024, 1));
        assert_eq!(ym(2024, 1).shift(-1).unwrap(), ym(2023, 12));
        assert_eq!(ym(2024, 2).shift(-12).unwrap(), ym(2023, 2));
        assert_eq!(ym(2024, 11).shift(-11).unwrap(), ym(2023, 12));
        assert_eq!(ym(2023, 12).shift(1).unwrap(), ym(2024, 1));
        assert_eq!(ym(2024, 6).shift(0).unwrap(), ym(2024, 6));
    }

    #[test]
    fn test_first_and_last_day() {
        let feb_leap = ym(2024, 2);
        assert_eq!(
            feb_leap.first_day(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert_eq!(
            feb_leap.last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            ym(2023, 2).last_day(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            ym(1900, 2).last_day(),
            NaiveDate::from_ymd_opt(1900, 2, 28).unwrap()
        );
        assert_eq!(
            ym(2024, 12).last_day(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert_eq!(
            ym(2024, 4).last_day(),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut months = vec![ym(2024, 1), ym(2023, 12), ym(2024, 10), ym(2023, 2)];
        months.sort();
        assert_eq!(
            months,
            vec![ym(2023, 2), ym(2023, 12), ym(2024, 1), ym(2024, 10)]
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("2024-03".parse::<YearMonth>().unwrap(), ym(2024, 3));
        assert_eq!("03/2024".parse::<YearMonth>().unwrap(), ym(2024, 3));
        assert_eq!(ym(2024, 3).to_string(), "2024-03");
        assert!("2024".parse::<YearMonth>().is_err());
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("abcd-01".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_contains() {
        let period = ym(2024, 3);
        assert!(period.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ym(2024, 7)).unwrap();
        assert_eq!(json, "\"2024-07\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym(2024, 7));
    }
}
