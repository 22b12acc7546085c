//! Series data structure for holding homogeneous data
//!
//! A Series is a one-dimensional array that can hold data of a specific type.
//! It's the building block of DataFrames. Float series use `NaN` as the
//! missing-value marker.

use super::*;

use chrono::NaiveDate;

/// A Series is a typed, one-dimensional array of data
#[derive(Clone, Debug, PartialEq)]
pub enum Series {
    /// Floating point numbers (f64), `NaN` marks a missing value
    Float(FloatArray),
    /// Integer numbers (i64)
    Int(IntArray),
    /// String values
    String(StringArray),
    /// Calendar dates
    Date(DateArray),
}

impl Series {
    /// Create a new Float series
    pub fn float(data: impl Into<FloatArray>) -> Self {
        Series::Float(data.into())
    }

    /// Create a new Int series
    pub fn int(data: impl Into<IntArray>) -> Self {
        Series::Int(data.into())
    }

    /// Create a new String series
    pub fn string(data: impl Into<StringArray>) -> Self {
        Series::String(data.into())
    }

    /// Create a new Date series
    pub fn date(data: impl Into<DateArray>) -> Self {
        Series::Date(data.into())
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        match self {
            Series::Float(arr) => arr.len(),
            Series::Int(arr) => arr.len(),
            Series::String(arr) => arr.len(),
            Series::Date(arr) => arr.len(),
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the type name of the series
    pub fn dtype(&self) -> &'static str {
        match self {
            Series::Float(_) => "float64",
            Series::Int(_) => "int64",
            Series::String(_) => "string",
            Series::Date(_) => "date",
        }
    }

    /// Whether the series holds numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Series::Float(_) | Series::Int(_))
    }

    /// Get a value at index
    pub fn get(&self, idx: usize) -> Option<SeriesValue> {
        match self {
            Series::Float(arr) => arr.get(idx).map(|&v| SeriesValue::Float(v)),
            Series::Int(arr) => arr.get(idx).map(|&v| SeriesValue::Int(v)),
            Series::String(arr) => arr.get(idx).map(|v| SeriesValue::String(v.clone())),
            Series::Date(arr) => arr.get(idx).map(|&v| SeriesValue::Date(v)),
        }
    }

    /// Borrow the float data, if this is a float series
    pub fn as_float(&self) -> Option<&FloatArray> {
        match self {
            Series::Float(arr) => Some(arr),
            _ => None,
        }
    }

    /// Borrow the dates, if this is a date series
    pub fn as_dates(&self) -> Option<&[NaiveDate]> {
        match self {
            Series::Date(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get a slice of the series
    pub fn slice(&self, range: std::ops::Range<usize>) -> Result<Self> {
        if range.end > self.len() || range.start > range.end {
            return Err(DataError::IndexOutOfBounds {
                index: range.end,
                len: self.len(),
            });
        }

        match self {
            Series::Float(arr) => Ok(Series::Float(
                arr.slice(ndarray::s![range.start..range.end]).to_owned(),
            )),
            Series::Int(arr) => Ok(Series::Int(
                arr.slice(ndarray::s![range.start..range.end]).to_owned(),
            )),
            Series::String(arr) => Ok(Series::String(arr[range].to_vec())),
            Series::Date(arr) => Ok(Series::Date(arr[range].to_vec())),
        }
    }

    /// Filter the series with a boolean mask
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("mask length {}", self.len()),
                actual: format!("mask length {}", mask.len()),
            });
        }

        let kept = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        self.take(&kept)
    }

    /// Gather rows by position. Every index must be in bounds.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(DataError::IndexOutOfBounds {
                index: bad,
                len: self.len(),
            });
        }

        Ok(match self {
            Series::Float(arr) => Series::Float(indices.iter().map(|&i| arr[i]).collect()),
            Series::Int(arr) => Series::Int(indices.iter().map(|&i| arr[i]).collect()),
            Series::String(vec) => Series::String(indices.iter().map(|&i| vec[i].clone()).collect()),
            Series::Date(vec) => Series::Date(indices.iter().map(|&i| vec[i]).collect()),
        })
    }

    /// Gather rows by optional position, filling `None` with the missing marker.
    ///
    /// Only float series can represent missing cells; other types are
    /// promoted to float first and fail if they are not numeric.
    pub fn take_or_missing(&self, indices: &[Option<usize>]) -> Result<Self> {
        let values = self.to_float_array()?;
        let out: FloatArray = indices
            .iter()
            .map(|idx| match idx {
                Some(i) => values.get(*i).copied().unwrap_or(f64::NAN),
                None => f64::NAN,
            })
            .collect();
        Ok(Series::Float(out))
    }

    /// Convert to a float array if possible
    pub fn to_float_array(&self) -> Result<FloatArray> {
        match self {
            Series::Float(arr) => Ok(arr.clone()),
            Series::Int(arr) => Ok(arr.iter().map(|&v| v as f64).collect()),
            Series::String(_) => Err(DataError::NonNumericData("string")),
            Series::Date(_) => Err(DataError::NonNumericData("date")),
        }
    }

    /// Number of missing cells (`NaN` for float series, never for others)
    pub fn missing_count(&self) -> usize {
        match self {
            Series::Float(arr) => arr.iter().filter(|v| is_missing(**v)).count(),
            _ => 0,
        }
    }

    /// Compute basic statistics over the non-missing values
    pub fn describe(&self) -> Result<SeriesStats> {
        let values = self.to_float_array()?;
        let present: Vec<f64> = values.iter().copied().filter(|v| !is_missing(*v)).collect();

        if present.is_empty() {
            return Ok(SeriesStats {
                missing: values.len(),
                ..SeriesStats::empty()
            });
        }

        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let std = if present.len() > 1 {
            (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };
        let min = present.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = present.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        Ok(SeriesStats {
            count: present.len(),
            missing: values.len() - present.len(),
            mean,
            std,
            min,
            q25: quantile(&present, 0.25).unwrap_or(f64::NAN),
            q50: quantile(&present, 0.5).unwrap_or(f64::NAN),
            q75: quantile(&present, 0.75).unwrap_or(f64::NAN),
            max,
        })
    }
}

/// Linear-interpolated quantile of unsorted data
pub(crate) fn quantile(data: &[f64], q: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let index = (n as f64 - 1.0) * q;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        Some(sorted[lower])
    } else {
        let weight = index - lower as f64;
        Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
    }
}

/// Statistical summary of a series
#[derive(Debug, Clone, serde::Serialize)]
pub struct SeriesStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl SeriesStats {
    pub(crate) fn empty() -> Self {
        Self {
            count: 0,
            missing: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            q50: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Enum for type-safe value access
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Float(f64),
    Int(i64),
    String(String),
    Date(NaiveDate),
}

impl std::fmt::Display for SeriesValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesValue::Float(v) if is_missing(*v) => write!(f, "NaN"),
            SeriesValue::Float(v) => write!(f, "{}", v),
            SeriesValue::Int(v) => write!(f, "{}", v),
            SeriesValue::String(v) => write!(f, "{}", v),
            SeriesValue::Date(v) => write!(f, "{}", v),
        }
    }
}
