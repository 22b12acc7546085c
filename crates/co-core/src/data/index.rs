//! Index structures for DataFrames

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::Month;

/// Index value enum
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Integer(usize),
    Date(NaiveDate),
    Month(Month),
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Integer(v) => write!(f, "{}", v),
            IndexValue::Date(v) => write!(f, "{}", v),
            IndexValue::Month(v) => write!(f, "{}", v),
        }
    }
}

/// Which kind of axis an [`Index`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexKind {
    Range,
    Daily,
    Monthly,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Range => write!(f, "range"),
            IndexKind::Daily => write!(f, "daily"),
            IndexKind::Monthly => write!(f, "monthly"),
        }
    }
}

/// Default range index
#[derive(Debug, Clone, PartialEq)]
pub struct RangeIndex {
    start: usize,
    end: usize,
}

impl RangeIndex {
    /// Create a new range index covering `start..end`
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a range index from 0 to n
    pub fn from_len(n: usize) -> Self {
        Self { start: 0, end: n }
    }

    fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Row axis of a DataFrame
///
/// Loaders produce positional (`Range`) frames; timestamp unification moves
/// them onto a `Monthly` axis. `Daily` exists for frames resampled straight
/// from their dates.
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    Range(RangeIndex),
    Daily(Vec<NaiveDate>),
    Monthly(Vec<Month>),
}

impl Index {
    /// Create a range index of length `n`
    pub fn range(n: usize) -> Self {
        Self::Range(RangeIndex::from_len(n))
    }

    /// Create a monthly index
    pub fn monthly(months: Vec<Month>) -> Self {
        Self::Monthly(months)
    }

    /// Create a daily index
    pub fn daily(dates: Vec<NaiveDate>) -> Self {
        Self::Daily(dates)
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            Index::Range(_) => IndexKind::Range,
            Index::Daily(_) => IndexKind::Daily,
            Index::Monthly(_) => IndexKind::Monthly,
        }
    }

    /// Whether rows are keyed by time
    pub fn is_time_based(&self) -> bool {
        !matches!(self, Index::Range(_))
    }

    /// Get the length of the index
    pub fn len(&self) -> usize {
        match self {
            Index::Range(idx) => idx.len(),
            Index::Daily(dates) => dates.len(),
            Index::Monthly(months) => months.len(),
        }
    }

    /// Check if index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get value at position
    pub fn get(&self, idx: usize) -> Option<IndexValue> {
        match self {
            Index::Range(rdx) => {
                let pos = rdx.start + idx;
                (pos < rdx.end).then_some(IndexValue::Integer(pos))
            }
            Index::Daily(dates) => dates.get(idx).map(|&d| IndexValue::Date(d)),
            Index::Monthly(months) => months.get(idx).map(|&m| IndexValue::Month(m)),
        }
    }

    /// Month of the row at `idx`, for time-based indexes
    pub fn month_at(&self, idx: usize) -> Option<Month> {
        match self {
            Index::Range(_) => None,
            Index::Daily(dates) => dates.get(idx).map(|&d| Month::from_date(d)),
            Index::Monthly(months) => months.get(idx).copied(),
        }
    }

    /// Borrow the months, if this is a monthly index
    pub fn months(&self) -> Option<&[Month]> {
        match self {
            Index::Monthly(months) => Some(months),
            _ => None,
        }
    }

    /// Slice the index
    pub fn slice(&self, range: std::ops::Range<usize>) -> Self {
        match self {
            Index::Range(idx) => Index::Range(RangeIndex::new(
                (idx.start + range.start).min(idx.end),
                (idx.start + range.end).min(idx.end),
            )),
            Index::Daily(dates) => Index::Daily(dates.get(range).map(<[_]>::to_vec).unwrap_or_default()),
            Index::Monthly(months) => {
                Index::Monthly(months.get(range).map(<[_]>::to_vec).unwrap_or_default())
            }
        }
    }

    /// Gather positions; range indexes are renumbered from zero
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            Index::Range(_) => Index::range(indices.len()),
            Index::Daily(dates) => Index::Daily(indices.iter().filter_map(|&i| dates.get(i).copied()).collect()),
            Index::Monthly(months) => {
                Index::Monthly(indices.iter().filter_map(|&i| months.get(i).copied()).collect())
            }
        }
    }
}
