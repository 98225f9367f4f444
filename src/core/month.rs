//! Calendar months as used for shard keys.
//!
//! Shards are named after the lowercase Indonesian month name
//! (`orders_januari`, `transactions_2024_maret`).

use crate::core::{Result, StoreError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Januari,
    Februari,
    Maret,
    April,
    Mei,
    Juni,
    Juli,
    Agustus,
    September,
    Oktober,
    November,
    Desember,
}

const ENGLISH: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Januari,
        Month::Februari,
        Month::Maret,
        Month::April,
        Month::Mei,
        Month::Juni,
        Month::Juli,
        Month::Agustus,
        Month::September,
        Month::Oktober,
        Month::November,
        Month::Desember,
    ];

    /// Lowercase shard name.
    pub fn name(self) -> &'static str {
        match self {
            Month::Januari => "januari",
            Month::Februari => "februari",
            Month::Maret => "maret",
            Month::April => "april",
            Month::Mei => "mei",
            Month::Juni => "juni",
            Month::Juli => "juli",
            Month::Agustus => "agustus",
            Month::September => "september",
            Month::Oktober => "oktober",
            Month::November => "november",
            Month::Desember => "desember",
        }
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Month> {
        if (1..=12).contains(&number) {
            Some(Self::ALL[(number - 1) as usize])
        } else {
            None
        }
    }

    pub fn of_date(date: NaiveDate) -> Month {
        Self::ALL[date.month0() as usize]
    }

    /// Parses a `YYYY-MM-DD` prefix (an ISO timestamp is accepted too).
    pub fn of_date_str(value: &str) -> Option<Month> {
        parse_date(value).map(Self::of_date)
    }

    /// Longest length the month can have in any year
    pub fn max_days(self) -> u32 {
        match self {
            Month::Februari => 29,
            month => month.days_in(2023),
        }
    }

    pub fn days_in(self, year: i32) -> u32 {
        let next = if self == Month::Desember {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, self.number() + 1, 1)
        };
        let first = NaiveDate::from_ymd_opt(year, self.number(), 1);
        match (first, next) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 31,
        }
    }
}

/// Parses the date part of a `YYYY-MM-DD[...]` string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        if let Ok(number) = normalized.parse::<u32>() {
            return Month::from_number(number)
                .ok_or_else(|| StoreError::InvalidShard(format!("month {number} out of range")));
        }
        Month::ALL
            .iter()
            .zip(ENGLISH.iter())
            .find(|(month, english)| month.name() == normalized || **english == normalized)
            .map(|(month, _)| *month)
            .ok_or_else(|| StoreError::InvalidShard(format!("unknown month '{value}'")))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_numbers() {
        assert_eq!("Januari".parse::<Month>().unwrap(), Month::Januari);
        assert_eq!("march".parse::<Month>().unwrap(), Month::Maret);
        assert_eq!("12".parse::<Month>().unwrap(), Month::Desember);
        assert!("13".parse::<Month>().is_err());
        assert!("smarch".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_of_date() {
        assert_eq!(Month::of_date_str("2024-08-17"), Some(Month::Agustus));
        assert_eq!(Month::of_date_str("2024-02-01T10:00:00Z"), Some(Month::Februari));
        assert_eq!(Month::of_date_str("17/08/2024"), None);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(Month::Februari.days_in(2024), 29);
        assert_eq!(Month::Februari.days_in(2023), 28);
        assert_eq!(Month::Desember.days_in(2023), 31);
        assert_eq!(Month::April.days_in(2023), 30);
        assert_eq!(Month::Februari.max_days(), 29);
        assert_eq!(Month::Januari.max_days(), 31);
        assert_eq!(Month::September.max_days(), 30);
    }
}
