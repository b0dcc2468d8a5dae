//! Normalizes the `cred` time argument to an explicit date pair.
//!
//! Accepted shapes:
//! - `last-month` - the full calendar month before today
//! - `YYYY-MM` - first to last day of that month
//! - `YYYY-MM-DD:YYYY-MM-DD` - an explicit inclusive range

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, SbxError};

pub const LAST_MONTH: &str = "last-month";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Parse a time argument; `today` anchors `last-month`.
    pub fn parse(input: &str, today: NaiveDate) -> Result<Self> {
        let input = input.trim();
        let invalid = || SbxError::InvalidTimeRange(input.to_string());

        if input == LAST_MONTH {
            return Self::last_month(today).ok_or_else(invalid);
        }

        if let Some((from, to)) = input.split_once(':') {
            let from = parse_day(from).ok_or_else(invalid)?;
            let to = parse_day(to).ok_or_else(invalid)?;
            if from > to {
                return Err(invalid());
            }
            return Ok(Self { from, to });
        }

        let (year, month) = parse_month(input).ok_or_else(invalid)?;
        Self::month(year, month).ok_or_else(invalid)
    }

    /// First to last calendar day of a month
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            from,
            to: next.pred_opt()?,
        })
    }

    /// The whole calendar month before `today`
    pub fn last_month(today: NaiveDate) -> Option<Self> {
        if today.month() == 1 {
            Self::month(today.year() - 1, 12)
        } else {
            Self::month(today.year(), today.month() - 1)
        }
    }

    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from_param(), self.to_param())
    }
}

/// Strict `YYYY-MM-DD`
fn parse_day(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Strict `YYYY-MM`
fn parse_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    if !year.chars().all(|c| c.is_ascii_digit()) || !month.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((year.parse().ok()?, month.parse().ok()?))
}
