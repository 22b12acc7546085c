//! DataFrame implementation for tabular data
//!
//! A DataFrame is a 2-dimensional labeled data structure with columns of
//! potentially different types sharing one row [`Index`]. Monthly frames are
//! the multi-series input of every model in the workspace.

use super::*;

use indexmap::IndexMap;
use ndarray::{stack, Axis};

/// Main DataFrame structure
#[derive(Clone, Debug, PartialEq)]
pub struct DataFrame {
    pub(crate) columns: IndexMap<String, Series>,
    pub(crate) index: Index,
    pub(crate) nrows: usize,
}

impl Default for DataFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFrame {
    /// Create an empty DataFrame
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
            index: Index::range(0),
            nrows: 0,
        }
    }

    /// Create DataFrame from columns
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        let mut builder = DataFrameBuilder::new();

        for (name, series) in columns.into_iter() {
            builder = builder.with_column(name, series)?;
        }

        builder.build()
    }

    /// Create a monthly frame of float columns
    pub fn monthly<I, S>(months: Vec<Month>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, FloatArray)>,
        S: Into<String>,
    {
        let mut builder = DataFrameBuilder::new().with_months(months);

        for (name, values) in columns.into_iter() {
            builder = builder.with_column(name, Series::Float(values))?;
        }

        builder.build()
    }

    /// Get the shape of the DataFrame (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    /// Get the number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// True when the frame has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.columns.is_empty()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Row index
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Months of a monthly frame
    pub fn months(&self) -> Option<&[Month]> {
        self.index.months()
    }

    /// Months of a monthly frame, or a typed error naming the actual index kind
    pub fn require_months(&self) -> Result<&[Month]> {
        self.index
            .months()
            .ok_or(DataError::NotMonthlyIndex(self.index.kind()))
    }

    /// Get a reference to a column
    pub fn get_column(&self, name: &str) -> Option<&Series> {
        self.columns.get(name)
    }

    /// Get a float column by name
    pub fn float_column(&self, name: &str) -> Result<&FloatArray> {
        match self.columns.get(name) {
            Some(Series::Float(arr)) => Ok(arr),
            Some(other) => Err(DataError::TypeMismatch {
                expected: "float64",
                actual: other.dtype(),
            }),
            None => Err(DataError::ColumnNotFound(name.to_string())),
        }
    }

    /// Iterate over (name, series) pairs in column order
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Replace the row index. The new index must match the row count.
    pub fn with_index(mut self, index: Index) -> Result<Self> {
        if index.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("index of length {}", self.nrows),
                actual: format!("index of length {}", index.len()),
            });
        }
        self.index = index;
        Ok(self)
    }

    /// Select specific columns
    pub fn select<I, S>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = DataFrameBuilder::new().with_index(self.index.clone());

        for name in names.into_iter() {
            let name = name.as_ref();
            match self.columns.get(name) {
                Some(series) => {
                    builder = builder.with_column(name, series.clone())?;
                }
                None => {
                    return Err(DataError::ColumnNotFound(name.to_string()));
                }
            }
        }

        builder.build()
    }

    /// Filter rows with a boolean mask
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("mask length {}", self.nrows),
                actual: format!("mask length {}", mask.len()),
            });
        }

        let kept: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&kept)
    }

    /// Gather rows by position (also used to reorder)
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.nrows) {
            return Err(DataError::IndexOutOfBounds {
                index: bad,
                len: self.nrows,
            });
        }

        let mut builder = DataFrameBuilder::new().with_index(self.index.take(indices));

        for (name, series) in &self.columns {
            builder = builder.with_column(name.clone(), series.take(indices)?)?;
        }

        builder.build()
    }

    /// Keep rows in `range`
    pub fn slice_rows(&self, range: std::ops::Range<usize>) -> Result<Self> {
        if range.end > self.nrows || range.start > range.end {
            return Err(DataError::IndexOutOfBounds {
                index: range.end,
                len: self.nrows,
            });
        }

        let mut builder = DataFrameBuilder::new().with_index(self.index.slice(range.clone()));

        for (name, series) in &self.columns {
            builder = builder.with_column(name.clone(), series.slice(range.clone())?)?;
        }

        builder.build()
    }

    /// Add a new column
    pub fn with_column<S: Into<String>>(mut self, name: S, series: Series) -> Result<Self> {
        let name = name.into();

        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }

        if (!self.columns.is_empty() || !self.index.is_empty()) && series.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} rows", self.nrows),
                actual: format!("{} rows", series.len()),
            });
        }

        if self.columns.is_empty() && self.index.is_empty() {
            self.nrows = series.len();
            self.index = Index::range(self.nrows);
        }

        self.columns.insert(name, series);
        Ok(self)
    }

    /// Replace an existing column, keeping its position
    pub fn replace_column(&mut self, name: &str, series: Series) -> Result<()> {
        if series.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} rows", self.nrows),
                actual: format!("{} rows", series.len()),
            });
        }

        match self.columns.get_mut(name) {
            Some(slot) => {
                *slot = series;
                Ok(())
            }
            None => Err(DataError::ColumnNotFound(name.to_string())),
        }
    }

    /// Rename columns
    pub fn rename<S1, S2>(mut self, mapping: &[(S1, S2)]) -> Result<Self>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        for (old_name, new_name) in mapping {
            let old_name = old_name.as_ref();
            let new_name = new_name.as_ref();

            if old_name == new_name {
                continue;
            }
            if self.columns.contains_key(new_name) {
                return Err(DataError::DuplicateColumn(new_name.to_string()));
            }

            let position = self
                .columns
                .get_index_of(old_name)
                .ok_or_else(|| DataError::ColumnNotFound(old_name.to_string()))?;
            if let Some(series) = self.columns.shift_remove(old_name) {
                self.columns
                    .shift_insert(position, new_name.to_string(), series);
            }
        }

        Ok(self)
    }

    /// Missing cells per column, in column order
    pub fn missing_counts(&self) -> IndexMap<String, usize> {
        self.columns
            .iter()
            .map(|(name, series)| (name.clone(), series.missing_count()))
            .collect()
    }

    /// Whether any numeric cell is missing
    pub fn has_missing(&self) -> bool {
        self.columns.values().any(|s| s.missing_count() > 0)
    }

    /// Names of the numeric columns, in column order
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, s)| s.is_numeric())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Get numeric columns as an (nrows x ncols) matrix
    pub fn numeric_matrix(&self) -> Result<Matrix> {
        let float_cols: Vec<FloatArray> = self
            .columns
            .values()
            .filter(|s| s.is_numeric())
            .map(Series::to_float_array)
            .collect::<Result<_>>()?;

        if float_cols.is_empty() {
            return Ok(Matrix::zeros((self.nrows, 0)));
        }

        // Stack columns into a matrix
        let arrays: Vec<ndarray::ArrayView1<f64>> =
            float_cols.iter().map(|arr| arr.view()).collect();

        stack(Axis(1), &arrays).map_err(|e| DataError::DimensionMismatch {
            expected: "compatible dimensions".to_string(),
            actual: e.to_string(),
        })
    }

    /// Descriptive statistics for every numeric column
    pub fn describe(&self) -> Result<IndexMap<String, SeriesStats>> {
        self.columns
            .iter()
            .filter(|(_, s)| s.is_numeric())
            .map(|(name, series)| Ok((name.clone(), series.describe()?)))
            .collect()
    }
}

impl std::fmt::Display for DataFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DataFrame({} rows × {} cols, {} index)",
            self.nrows,
            self.ncols(),
            self.index.kind()
        )
    }
}
