//! Cleaning of loaded frames
//!
//! Moves positional frames onto a month axis, resamples observations into
//! one value per calendar month, and rescales series before modelling.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{
    is_missing, quantile, DataError, DataFrame, FloatArray, Index, Month, Result, Series,
    TimeSeries,
};

/// Standard deviations below this are treated as zero
const ZERO_STD_TOLERANCE: f64 = 1e-12;

/// Rescaling applied to a monthly series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Normalization {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "z-score", alias = "zscore")]
    ZScore,
    #[serde(rename = "log")]
    Log,
}

/// Reduction applied to the observations of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    Median,
    Min,
    Max,
    Count,
    First,
    Last,
}

impl Aggregation {
    /// Reduce the non-missing values of one bucket
    fn apply(self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Count => values.len() as f64,
            _ if values.is_empty() => f64::NAN,
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Median => quantile(values, 0.5).unwrap_or(f64::NAN),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::First => values[0],
            Aggregation::Last => values[values.len() - 1],
        }
    }
}

/// Key rows by the calendar month of `date_col`.
///
/// Rows are stably sorted by date and the frame gets a monthly index (one
/// entry per row, so daily data repeats months until it is aggregated). The
/// date column itself is kept.
pub fn unify_timestamps(frame: &DataFrame, date_col: &str) -> Result<DataFrame> {
    info!("Unifying timestamps for column: {}", date_col);

    let series = frame
        .get_column(date_col)
        .ok_or_else(|| DataError::ColumnNotFound(date_col.to_string()))?;
    let dates = series.as_dates().ok_or(DataError::TypeMismatch {
        expected: "date",
        actual: series.dtype(),
    })?;

    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&i| dates[i]);

    let months = order.iter().map(|&i| Month::from_date(dates[i])).collect();
    frame.take_rows(&order)?.with_index(Index::monthly(months))
}

/// Rescale a series; missing values stay missing.
///
/// `ZScore` uses the population standard deviation and returns the input
/// untouched when that deviation is zero. `Log` maps values `<= 0` to `0`
/// (they are replaced by 1 before taking the logarithm).
pub fn normalize(series: &TimeSeries, method: Normalization) -> TimeSeries {
    debug!("Normalizing '{}' using {:?}", series.name(), method);

    match method {
        Normalization::None => series.clone(),
        Normalization::ZScore => {
            let present = series.present_values();
            if present.is_empty() {
                warn!("Series '{}' has no values to normalize", series.name());
                return series.clone();
            }

            let n = present.len() as f64;
            let mean = present.iter().sum::<f64>() / n;
            let std = (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            if std < ZERO_STD_TOLERANCE {
                warn!(
                    "Standard deviation is zero for series '{}', returning it unchanged",
                    series.name()
                );
                return series.clone();
            }

            series.map(|v| (v - mean) / std)
        }
        Normalization::Log => {
            let non_positive = series.values().iter().filter(|v| **v <= 0.0).count();
            if non_positive > 0 {
                warn!(
                    "Series '{}' contains {} non-positive values, replacing them with 1 before the log transform",
                    series.name(),
                    non_positive
                );
            }

            series.map(|v| if v <= 0.0 { 0.0 } else { v.ln() })
        }
    }
}

/// Resample `value_col` to one value per calendar month.
///
/// The frame's index must be time based. Output covers every month from the
/// first to the last observation; months without observations are missing,
/// except for `Sum` and `Count`, which report 0.
pub fn aggregate_monthly(frame: &DataFrame, value_col: &str, agg: Aggregation) -> Result<TimeSeries> {
    info!("Aggregating column '{}' monthly using {:?}", value_col, agg);

    let values = frame
        .get_column(value_col)
        .ok_or_else(|| DataError::ColumnNotFound(value_col.to_string()))?
        .to_float_array()?;

    let index = frame.index();
    if !index.is_time_based() {
        return Err(DataError::NotMonthlyIndex(index.kind()));
    }

    let mut buckets: BTreeMap<Month, Vec<f64>> = BTreeMap::new();
    for (row, &value) in values.iter().enumerate() {
        let Some(month) = index.month_at(row) else {
            continue;
        };
        let bucket = buckets.entry(month).or_default();
        if !is_missing(value) {
            bucket.push(value);
        }
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return TimeSeries::new(value_col, Vec::new(), FloatArray::zeros(0));
    };

    let months = Month::range_inclusive(first, last);
    let aggregated: FloatArray = months
        .iter()
        .map(|m| agg.apply(buckets.get(m).map(Vec::as_slice).unwrap_or(&[])))
        .collect();

    debug!(
        "Aggregated {} rows of '{}' into {} months",
        values.len(),
        value_col,
        months.len()
    );
    TimeSeries::new(value_col, months, aggregated)
}

/// Aggregate several columns and join them on one monthly frame.
///
/// Columns cover the union of their month ranges, missing cells are `NaN`.
pub fn aggregate_frame(frame: &DataFrame, columns: &[(&str, Aggregation)]) -> Result<DataFrame> {
    let series = columns
        .iter()
        .map(|(name, agg)| aggregate_monthly(frame, name, *agg))
        .collect::<Result<Vec<_>>>()?;

    let (Some(first), Some(last)) = (
        series.iter().filter_map(TimeSeries::first_month).min(),
        series.iter().filter_map(TimeSeries::last_month).max(),
    ) else {
        return DataFrame::monthly(Vec::new(), series.iter().map(|s| (s.name().to_string(), FloatArray::zeros(0))));
    };

    let months = Month::range_inclusive(first, last);
    let mut out = DataFrame::monthly(months.clone(), std::iter::empty::<(String, FloatArray)>())?;
    for s in &series {
        let values: FloatArray = months.iter().map(|m| s.get(*m).unwrap_or(f64::NAN)).collect();
        out = out.with_column(s.name(), Series::Float(values))?;
    }
    Ok(out)
}
