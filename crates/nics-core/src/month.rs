//! Month label parsing
//!
//! Every report page carries a header such as `March - 2021`. The label is
//! normalized to a sortable `YYYY-MM` key that tags every row of the page.

use std::fmt;
use std::str::FromStr;

use chrono::Month;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ExtractError, Result};

lazy_static! {
    static ref MONTH_LABEL: Regex = Regex::new(r"^\s*([A-Za-z]+)\s+-\s+(\d{4})\s*$").unwrap();
}

/// Normalized `YYYY-MM` month of a report page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
    key: String,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return None;
        }
        Some(Self {
            year,
            month,
            key: format!("{:04}-{:02}", year, month),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// `(year, mon_num)` as written to the export: `("2021", "03")`.
    pub fn split(&self) -> (&str, &str) {
        (&self.key[..4], &self.key[5..])
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for MonthKey {
    type Err = ExtractError;

    /// Parse an already normalized `YYYY-MM` key.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ExtractError::Format {
            text: s.to_string(),
        };
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

/// Parse a page header of the form `"<FullMonthName> - <Year>"`.
///
/// The month must be spelled out in full (any letter case) and the year must
/// have four digits. Anything else fails with [`ExtractError::Format`]
/// carrying the unparsed text.
pub fn parse_month_label(text: &str) -> Result<MonthKey> {
    let invalid = || ExtractError::Format {
        text: text.to_string(),
    };

    let caps = MONTH_LABEL.captures(text).ok_or_else(invalid)?;
    let name = &caps[1];
    let month = Month::from_str(name).map_err(|_| invalid())?;
    // chrono also accepts three-letter abbreviations
    if !month.name().eq_ignore_ascii_case(name) {
        return Err(invalid());
    }
    let year: i32 = caps[2].parse().map_err(|_| invalid())?;

    MonthKey::new(year, month.number_from_month()).ok_or_else(invalid)
}
