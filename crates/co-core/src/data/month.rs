//! Calendar month period type

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{DataError, Result};

/// A calendar month with no day component.
///
/// Months order chronologically (year first, then month) and support
/// successor arithmetic, which is what gap detection and resampling need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, validating `month` is in `1..=12`
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(DataError::InvalidParameter(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`
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

    /// Months since year 0, used for contiguous-range arithmetic
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// Inverse of [`Month::ordinal`]
    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: (ordinal.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn succ(&self) -> Self {
        Self::from_ordinal(self.ordinal() + 1)
    }

    pub fn pred(&self) -> Self {
        Self::from_ordinal(self.ordinal() - 1)
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: Month) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// Every month from `start` to `end`, both inclusive. Empty when `end < start`.
    pub fn range_inclusive(start: Month, end: Month) -> Vec<Month> {
        (start.ordinal()..=end.ordinal())
            .map(Month::from_ordinal)
            .collect()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Month-end date, the label used for monthly resampling buckets
    pub fn last_day(&self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MIN)
    }

    /// English month name, e.g. `February`
    pub fn name(&self) -> &'static str {
        chrono::Month::try_from(self.month as u8)
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// Format as `MM.YYYY`
    pub fn to_dotted(&self) -> String {
        format!("{:02}.{:04}", self.month, self.year)
    }

    /// Parse `MM.YYYY` (single-digit months are accepted)
    pub fn parse_dotted(s: &str) -> Result<Self> {
        let (m, y) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| DataError::InvalidDate(s.to_string()))?;
        let month = m
            .trim()
            .parse::<u32>()
            .map_err(|_| DataError::InvalidDate(s.to_string()))?;
        let year = y
            .trim()
            .parse::<i32>()
            .map_err(|_| DataError::InvalidDate(s.to_string()))?;
        Month::new(year, month).map_err(|_| DataError::InvalidDate(s.to_string()))
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month::from_date(date)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = DataError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| DataError::InvalidDate(s.to_string()))?;
        let year = y
            .parse::<i32>()
            .map_err(|_| DataError::InvalidDate(s.to_string()))?;
        let month = m
            .parse::<u32>()
            .map_err(|_| DataError::InvalidDate(s.to_string()))?;
        Month::new(year, month).map_err(|_| DataError::InvalidDate(s.to_string()))
    }
}
