use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// Creates a period, returning `None` if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        // Round-tripping through chrono rejects out-of-range years as well as months.
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Sortable month label, e.g. `2024-03`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn quarter(&self) -> QuarterPeriod {
        QuarterPeriod {
            year: self.year,
            quarter: (self.month - 1) / 3 + 1,
        }
    }
}

impl FromStr for MonthPeriod {
    type Err = CoreError;

    /// Accepts `YYYYMM` (optionally with a trailing `.0`, as spreadsheets export
    /// integer cells), `YYYY-MM` and `YYYY/MM`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidPeriod(raw.to_string());
        let s = raw.trim();
        let s = s.strip_suffix(".0").unwrap_or(s);

        let (year, month) = match s.find(['-', '/']) {
            Some(idx) => (&s[..idx], &s[idx + 1..]),
            None if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) => s.split_at(4),
            None => return Err(invalid()),
        };

        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthPeriod {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthPeriod> for String {
    fn from(period: MonthPeriod) -> Self {
        period.label()
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A calendar quarter, labelled like `2024Q1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterPeriod {
    year: i32,
    quarter: u32,
}

impl QuarterPeriod {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u32 {
        self.quarter
    }

    pub fn label(&self) -> String {
        format!("{:04}Q{}", self.year, self.quarter)
    }
}

impl fmt::Display for QuarterPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}Q{}", self.year, self.quarter)
    }
}
