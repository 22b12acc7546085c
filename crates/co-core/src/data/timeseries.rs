//! Single monthly series

use super::*;

/// An ordered sequence of (month, value) pairs, one value per month.
///
/// Months strictly increase; values may be missing (`NaN`).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    months: Vec<Month>,
    values: FloatArray,
}

impl TimeSeries {
    /// Create a series, validating lengths and month ordering
    pub fn new(name: impl Into<String>, months: Vec<Month>, values: impl Into<FloatArray>) -> Result<Self> {
        let values = values.into();
        if months.len() != values.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} values", months.len()),
                actual: format!("{} values", values.len()),
            });
        }
        check_strictly_increasing(&months)?;

        Ok(Self {
            name: name.into(),
            months,
            values,
        })
    }

    /// Consecutive months starting at `start`
    pub fn contiguous(name: impl Into<String>, start: Month, values: impl Into<FloatArray>) -> Self {
        let values = values.into();
        let months = (0..values.len() as i64)
            .map(|i| Month::from_ordinal(start.ordinal() + i))
            .collect();
        Self {
            name: name.into(),
            months,
            values,
        }
    }

    /// Extract one float column of a monthly frame
    pub fn from_frame(df: &DataFrame, column: &str) -> Result<Self> {
        let months = df.require_months()?.to_vec();
        let values = df.float_column(column)?.clone();
        Self::new(column, months, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn values(&self) -> &FloatArray {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_month(&self) -> Option<Month> {
        self.months.first().copied()
    }

    pub fn last_month(&self) -> Option<Month> {
        self.months.last().copied()
    }

    /// Value at `month`; `None` when the month is not on the axis
    pub fn get(&self, month: Month) -> Option<f64> {
        self.months
            .binary_search(&month)
            .ok()
            .map(|i| self.values[i])
    }

    /// Iterate over (month, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        self.months.iter().copied().zip(self.values.iter().copied())
    }

    /// Non-missing values in order
    pub fn present_values(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| !is_missing(*v)).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| is_missing(**v)).count()
    }

    /// Same axis, new values
    pub fn with_values(&self, values: impl Into<FloatArray>) -> Result<Self> {
        Self::new(self.name.clone(), self.months.clone(), values)
    }

    /// Same axis, values transformed elementwise
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            name: self.name.clone(),
            months: self.months.clone(),
            values: self.values.mapv(f),
        }
    }

    /// Keep rows from `start` onwards
    pub fn skip(&self, start: usize) -> Self {
        let start = start.min(self.len());
        Self {
            name: self.name.clone(),
            months: self.months[start..].to_vec(),
            values: self.values.slice(ndarray::s![start..]).to_owned(),
        }
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Single-column monthly frame named after the series
    pub fn to_frame(&self) -> Result<DataFrame> {
        DataFrame::monthly(
            self.months.clone(),
            [(self.name.clone(), self.values.clone())],
        )
    }
}

pub(crate) fn check_strictly_increasing(months: &[Month]) -> Result<()> {
    for pair in months.windows(2) {
        if pair[0] == pair[1] {
            return Err(DataError::DuplicateMonth(pair[0]));
        }
        if pair[0] > pair[1] {
            return Err(DataError::UnsortedMonths {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}
