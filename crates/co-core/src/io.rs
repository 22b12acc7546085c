//! Raw CSV input
//!
//! Each data source has its own delimiter, header language and date layout.
//! The [`SourceKind`] a caller declares picks the schema; paths are never
//! inspected to guess it.

mod loader;
mod reshape;


use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clean::{aggregate_monthly, unify_timestamps, Aggregation};
use crate::data::{DataError, TimeSeries};
use crate::error::Result;

pub use loader::{load, load_or_empty};
pub use reshape::{reshape_file, reshape_wide_indicators, ReshapeSummary, DEFAULT_DATE_HEADER};

/// Name of the derived date column every loader emits
pub const DATE_COLUMN: &str = "Date";

/// Which raw dataset a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Daily weather observations, semicolon-delimited, Russian headers
    Temperature,
    /// Monthly registered deaths, comma-delimited, English month names
    Mortality,
    /// Monthly road-accident indicators, semicolon-delimited, `MM.YYYY` dates
    RoadAccidents,
}

impl SourceKind {
    pub fn delimiter(self) -> u8 {
        match self {
            SourceKind::Temperature | SourceKind::RoadAccidents => b';',
            SourceKind::Mortality => b',',
        }
    }

    /// Raw header -> canonical column name
    pub fn renames(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SourceKind::Temperature => &[
                ("Год", "Year"),
                ("Месяц", "Month"),
                ("День", "Day"),
                ("Средняя температура воздуха", "Temperature"),
                ("Количество осадков", "Precipitation"),
            ],
            SourceKind::Mortality => &[("StateRegistrationOfDeath", "Mortality")],
            SourceKind::RoadAccidents => &[
                (DEFAULT_DATE_HEADER, DATE_COLUMN),
                ("ДТП", "Accidents"),
                ("Погибло", "Deaths"),
                ("Ранено", "Injured"),
            ],
        }
    }

    /// Numeric columns kept in the loaded frame, in output order
    pub fn value_columns(self) -> &'static [&'static str] {
        match self {
            SourceKind::Temperature => &["Temperature", "Precipitation"],
            SourceKind::Mortality => &["Mortality"],
            SourceKind::RoadAccidents => &["Accidents", "Deaths", "Injured"],
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Temperature => write!(f, "temperature"),
            SourceKind::Mortality => write!(f, "mortality"),
            SourceKind::RoadAccidents => write!(f, "road_accidents"),
        }
    }
}

/// Errors raised while reading raw files
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{kind} data is missing column '{column}'")]
    MissingColumn { kind: SourceKind, column: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

/// Load `path` as `kind` and resample `column` to one value per month.
///
/// Raw-file failures surface as [`CoreError::Load`](crate::CoreError::Load),
/// a missing or non-numeric column as [`CoreError::Data`](crate::CoreError::Data).
pub fn load_monthly(
    path: impl AsRef<Path>,
    kind: SourceKind,
    column: &str,
    agg: Aggregation,
) -> Result<TimeSeries> {
    let raw = load(path, kind)?;
    let keyed = unify_timestamps(&raw, DATE_COLUMN)?;
    Ok(aggregate_monthly(&keyed, column, agg)?)
}
