//! Wide-to-long conversion of the road-accident export
//!
//! The published table has one row per indicator and one column per month
//! (`"январь 2013"`, ...). The loader wants one row per month, so the table is
//! transposed and every month label is rewritten as `MM.YYYY`.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::LoadError;
use crate::data::Month;

/// Header of the date column in the reshaped file
pub const DEFAULT_DATE_HEADER: &str = "Дата(месяц,год)";

const RUSSIAN_MONTHS: [&str; 12] = [
    "январь",
    "февраль",
    "март",
    "апрель",
    "май",
    "июнь",
    "июль",
    "август",
    "сентябрь",
    "октябрь",
    "ноябрь",
    "декабрь",
];

/// What a reshape produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReshapeSummary {
    pub indicators: Vec<String>,
    pub months: usize,
    /// Month labels that could not be parsed and were copied verbatim
    pub unparsed_labels: Vec<String>,
}

/// Transpose a semicolon-delimited indicator table read from `reader` into
/// `writer`.
pub fn reshape_wide_indicators<R: Read, W: Write>(
    reader: R,
    writer: W,
    date_header: &str,
) -> Result<ReshapeSummary, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = reader.records();
    let header = rows.next().ok_or_else(|| LoadError::Parse {
        line: 1,
        message: "input has no header row".to_string(),
    })??;
    let data_rows = rows.collect::<Result<Vec<_>, _>>()?;

    let indicators: Vec<String> = data_rows
        .iter()
        .map(|row| row.get(0).unwrap_or("").trim().to_string())
        .collect();

    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    writer.write_record(std::iter::once(date_header).chain(indicators.iter().map(String::as_str)))?;

    let mut unparsed_labels = Vec::new();
    let labels: Vec<&str> = header.iter().skip(1).collect();
    for (i, label) in labels.iter().enumerate() {
        let date = match format_month_label(label) {
            Some(dotted) => dotted,
            None => {
                warn!("Could not parse month label '{}', keeping it as is", label);
                unparsed_labels.push(label.to_string());
                label.to_string()
            }
        };

        let mut out = Vec::with_capacity(data_rows.len() + 1);
        out.push(date);
        for row in &data_rows {
            // short indicator rows are padded
            out.push(row.get(i + 1).unwrap_or("").to_string());
        }
        writer.write_record(&out)?;
    }
    writer.flush()?;

    Ok(ReshapeSummary {
        indicators,
        months: labels.len(),
        unparsed_labels,
    })
}

/// Reshape `input` into `output` on disk
pub fn reshape_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    date_header: &str,
) -> Result<ReshapeSummary, LoadError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let source = File::open(input).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(input.to_path_buf()),
        _ => LoadError::Io(e),
    })?;
    let target = File::create(output)?;

    let summary = reshape_wide_indicators(source, target, date_header)?;
    info!(
        "Reshaped {} months x {} indicators into {}",
        summary.months,
        summary.indicators.len(),
        output.display()
    );
    Ok(summary)
}

/// `"январь 2013"` -> `"01.2013"`
fn format_month_label(label: &str) -> Option<String> {
    let mut parts = label.trim().trim_matches('"').split_whitespace();
    let (name, year) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let name = name.to_lowercase();
    let number = RUSSIAN_MONTHS.iter().position(|m| *m == name)? as u32 + 1;
    let year = year.parse::<i32>().ok()?;
    Month::new(year, number).ok().map(|m| m.to_dotted())
}
