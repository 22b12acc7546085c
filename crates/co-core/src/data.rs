//! Core data structures for ChronOxide
//!
//! This module provides the column store the analysis pipeline runs on:
//! typed series, a frame keyed by column name, and the calendar-month axis
//! every monthly series is aligned to.

mod builder;
mod dataframe;
mod index;
mod month;
mod series;
mod timeseries;

#[cfg(test)]
mod tests;

// Re-exports
pub use builder::DataFrameBuilder;
pub use dataframe::DataFrame;
pub use index::{Index, IndexKind, IndexValue, RangeIndex};
pub use month::Month;
pub use series::{Series, SeriesStats, SeriesValue};
pub(crate) use series::quantile;
pub(crate) use timeseries::check_strictly_increasing;
pub use timeseries::TimeSeries;

// Type aliases for common use cases
pub type FloatArray = ndarray::Array1<f64>;
pub type IntArray = ndarray::Array1<i64>;
pub type StringArray = Vec<String>;
pub type DateArray = Vec<chrono::NaiveDate>;
pub type Matrix = ndarray::Array2<f64>;

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid column type: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Operation requires numeric data, got {0}")]
    NonNumericData(&'static str),

    #[error("Operation requires a monthly index, got {0}")]
    NotMonthlyIndex(IndexKind),

    #[error("Month {0} appears more than once")]
    DuplicateMonth(Month),

    #[error("Months must be strictly increasing: {previous} is followed by {next}")]
    UnsortedMonths { previous: Month, next: Month },

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// True for the missing-value marker used by float columns.
#[inline]
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}
