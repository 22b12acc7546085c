//! Source-specific CSV loaders

use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{error, info};

use super::{LoadError, SourceKind, DATE_COLUMN};
use crate::data::{DataFrame, FloatArray, Month, Series};

/// Load one raw file into a positional frame with a `Date` column followed by
/// the source's value columns.
pub fn load(path: impl AsRef<Path>, kind: SourceKind) -> Result<DataFrame, LoadError> {
    let path = path.as_ref();
    info!("Loading {} data from {}", kind, path.display());

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(kind.delimiter())
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::new(&headers, kind);

    let mut parser = RowParser::new(kind, &columns)?;
    for (idx, record) in reader.records().enumerate() {
        // records start on the line after the header, lines are 1-based
        let line = idx + 2;
        parser.push(&record?, line)?;
    }

    let frame = parser.finish()?;
    info!("{} data loaded: {} rows", kind, frame.nrows());
    Ok(frame)
}

/// Like [`load`], but logs the failure and returns an empty frame.
pub fn load_or_empty(path: impl AsRef<Path>, kind: SourceKind) -> DataFrame {
    match load(path, kind) {
        Ok(frame) => frame,
        Err(e) => {
            error!("Error loading {} data: {}", kind, e);
            DataFrame::new()
        }
    }
}

/// Canonical column name -> position in the record
struct ColumnMap {
    kind: SourceKind,
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    fn new(headers: &StringRecord, kind: SourceKind) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                // spreadsheet exports may prefix the first header with a BOM
                let raw = raw.trim().trim_start_matches('\u{feff}');
                let name = kind
                    .renames()
                    .iter()
                    .find(|(from, _)| *from == raw)
                    .map(|(_, to)| *to)
                    .unwrap_or(raw);
                (name.to_string(), idx)
            })
            .collect();
        Self { kind, positions }
    }

    fn require(&self, name: &str) -> Result<usize, LoadError> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn {
                kind: self.kind,
                column: name.to_string(),
            })
    }
}

/// How a source derives its date
enum DateLayout {
    YearMonthDay { year: usize, month: usize, day: usize },
    YearMonthName { year: usize, month: usize },
    Dotted { date: usize },
}

struct RowParser {
    kind: SourceKind,
    layout: DateLayout,
    value_positions: Vec<usize>,
    dates: Vec<NaiveDate>,
    values: Vec<Vec<f64>>,
}

impl RowParser {
    fn new(kind: SourceKind, columns: &ColumnMap) -> Result<Self, LoadError> {
        let layout = match kind {
            SourceKind::Temperature => DateLayout::YearMonthDay {
                year: columns.require("Year")?,
                month: columns.require("Month")?,
                day: columns.require("Day")?,
            },
            SourceKind::Mortality => DateLayout::YearMonthName {
                year: columns.require("Year")?,
                month: columns.require("Month")?,
            },
            SourceKind::RoadAccidents => DateLayout::Dotted {
                date: columns.require(DATE_COLUMN)?,
            },
        };

        let value_positions = kind
            .value_columns()
            .iter()
            .map(|name| columns.require(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            layout,
            values: vec![Vec::new(); value_positions.len()],
            value_positions,
            dates: Vec::new(),
        })
    }

    fn push(&mut self, record: &StringRecord, line: usize) -> Result<(), LoadError> {
        let field = |pos: usize| record.get(pos).unwrap_or("");

        let date = match self.layout {
            DateLayout::YearMonthDay { year, month, day } => {
                let y = parse_int(field(year), line)?;
                let m = parse_int(field(month), line)?;
                let d = parse_int(field(day), line)?;
                NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32).ok_or_else(|| {
                    LoadError::Parse {
                        line,
                        message: format!("invalid date {}-{}-{}", y, m, d),
                    }
                })?
            }
            DateLayout::YearMonthName { year, month } => {
                let y = parse_int(field(year), line)?;
                let m = parse_month(field(month), line)?;
                month_start(y, m, line)?
            }
            DateLayout::Dotted { date } => Month::parse_dotted(field(date))
                .map_err(|e| LoadError::Parse {
                    line,
                    message: e.to_string(),
                })?
                .first_day(),
        };
        self.dates.push(date);

        for (slot, &pos) in self.values.iter_mut().zip(&self.value_positions) {
            slot.push(parse_value(field(pos), line)?);
        }
        Ok(())
    }

    fn finish(self) -> Result<DataFrame, LoadError> {
        let mut columns = Vec::with_capacity(self.values.len() + 1);
        columns.push((DATE_COLUMN, Series::date(self.dates)));
        for (name, values) in self.kind.value_columns().iter().zip(self.values) {
            columns.push((*name, Series::Float(FloatArray::from(values))));
        }
        Ok(DataFrame::from_columns(columns)?)
    }
}

fn parse_int(raw: &str, line: usize) -> Result<i64, LoadError> {
    raw.trim().parse::<i64>().map_err(|_| LoadError::Parse {
        line,
        message: format!("expected an integer, got '{}'", raw),
    })
}

/// Full or abbreviated English month name, or a month number
fn parse_month(raw: &str, line: usize) -> Result<u32, LoadError> {
    let raw = raw.trim();
    if let Ok(month) = raw.parse::<chrono::Month>() {
        return Ok(month.number_from_month());
    }
    raw.parse::<u32>().map_err(|_| LoadError::Parse {
        line,
        message: format!("unrecognised month '{}'", raw),
    })
}

fn month_start(year: i64, month: u32, line: usize) -> Result<NaiveDate, LoadError> {
    Month::new(year as i32, month)
        .map(|m| m.first_day())
        .map_err(|e| LoadError::Parse {
            line,
            message: e.to_string(),
        })
}

/// Empty cells are missing; a decimal comma is accepted
pub(crate) fn parse_value(raw: &str, line: usize) -> Result<f64, LoadError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.replace(',', ".")
        .parse::<f64>()
        .map_err(|_| LoadError::Parse {
            line,
            message: format!("expected a number, got '{}'", raw),
        })
}
