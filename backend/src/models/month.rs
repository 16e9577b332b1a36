//! Calendar-month keys for requests, approvals, and the commission ledger.
//!
//! The portal keys everything on a composite (month, year) pair. The month
//! half uses the three-letter token the commission source has always used
//! ("Jan", "Feb", ...), but the year is always carried alongside it so that
//! requests from different years never collide on the same token.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing month tokens and month keys
#[derive(Debug, Error, PartialEq)]
pub enum MonthParseError {
    #[error("Unrecognized month token: {0:?}")]
    UnrecognizedToken(String),

    #[error("Invalid month key {0:?}, expected e.g. \"Mar 2026\"")]
    InvalidKey(String),

    #[error("Invalid year in month key: {0:?}")]
    InvalidYear(String),
}

/// A calendar month, identified by its three-letter token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Three-letter token ("Mar")
    pub fn token(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// Month number, 1-12
    pub fn number(&self) -> u32 {
        match self {
            Month::Jan => 1,
            Month::Feb => 2,
            Month::Mar => 3,
            Month::Apr => 4,
            Month::May => 5,
            Month::Jun => 6,
            Month::Jul => 7,
            Month::Aug => 8,
            Month::Sep => 9,
            Month::Oct => 10,
            Month::Nov => 11,
            Month::Dec => 12,
        }
    }

    /// Month from its 1-12 number
    pub fn from_number(n: u32) -> Option<Month> {
        Month::ALL.get(n.checked_sub(1)? as usize).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    /// Parse a three-letter token, case-insensitively ("Mar", "mar", "MAR")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::ALL
            .iter()
            .find(|m| m.token().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| MonthParseError::UnrecognizedToken(s.to_string()))
    }
}

/// Composite (year, month) key
///
/// Identifies one calendar month unambiguously. Orders chronologically, so
/// sorting descending gives most-recent-first request histories.
///
/// # Example
/// ```
/// use advance_portal_core_rs::models::month::{Month, MonthKey};
///
/// let mar = MonthKey::new(Month::Mar, 2026);
/// let apr = MonthKey::new(Month::Apr, 2026);
/// assert!(mar < apr);
/// assert_eq!(mar.to_string(), "Mar 2026");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    pub fn new(month: Month, year: i32) -> Self {
        Self { year, month }
    }

    /// The key for the current month, from local wall-clock time
    pub fn current() -> Self {
        let now = Local::now();
        // chrono months are always 1-12
        let month = Month::from_number(now.month()).expect("chrono month in 1-12");
        Self {
            year: now.year(),
            month,
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = MonthParseError;

    /// Parse "Mar 2026" (also accepts "Mar-2026")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, [' ', '-']);
        let token = parts
            .next()
            .ok_or_else(|| MonthParseError::InvalidKey(s.to_string()))?;
        let year_part = parts
            .next()
            .ok_or_else(|| MonthParseError::InvalidKey(s.to_string()))?;

        let month: Month = token.parse()?;
        let year: i32 = year_part
            .trim()
            .parse()
            .map_err(|_| MonthParseError::InvalidYear(year_part.to_string()))?;

        Ok(MonthKey { year, month })
    }
}
