//! First differencing of series and frames

use serde::Serialize;
use tracing::{info, warn};

use co_core::data::{DataFrame, FloatArray, Series, TimeSeries};

use super::{check_frame, SeriesStationarity, StationarityConfig};
use crate::base::Result;

/// Data that can be replaced by its first differences.
///
/// One application drops the first row; every later row holds
/// `x[t] - x[t-1]`.
pub trait Differencing: Sized {
    fn difference(&self) -> Result<Self>;
}

fn diff_values(values: &FloatArray) -> FloatArray {
    (1..values.len()).map(|i| values[i] - values[i - 1]).collect()
}

impl Differencing for TimeSeries {
    fn difference(&self) -> Result<Self> {
        Ok(self.skip(1).with_values(diff_values(self.values()))?)
    }
}

impl Differencing for DataFrame {
    /// Numeric columns are differenced; other columns keep their values
    /// from the second row on.
    fn difference(&self) -> Result<Self> {
        if self.nrows() == 0 {
            return Ok(self.clone());
        }

        let mut out = self.slice_rows(1..self.nrows())?;
        for (name, series) in self.iter_columns().filter(|(_, s)| s.is_numeric()) {
            let diffed = diff_values(&series.to_float_array()?);
            out.replace_column(name, Series::Float(diffed))?;
        }
        Ok(out)
    }
}

/// Apply first differences `order` times; order 0 returns a copy
pub fn apply_differencing<D: Differencing + Clone>(data: &D, order: usize) -> Result<D> {
    let mut current = data.clone();
    for _ in 0..order {
        current = current.difference()?;
    }
    Ok(current)
}

/// Result of the differencing loop
#[derive(Debug, Clone, Serialize)]
pub struct DifferencingOutcome {
    #[serde(skip)]
    pub frame: DataFrame,
    /// Number of differences applied
    pub order: usize,
    /// Whether every column passed both tests at `order`
    pub stationary: bool,
    /// Verdicts at the final order
    pub verdicts: Vec<SeriesStationarity>,
}

/// Difference the whole frame until every numeric column is stationary under
/// both tests, or until `config.max_diff_order` differences are applied.
pub fn difference_until_stationary(frame: &DataFrame, config: &StationarityConfig) -> Result<DifferencingOutcome> {
    let mut current = frame.clone();
    let mut order = 0;

    loop {
        let verdicts = check_frame(&current, config)?;
        let stationary = verdicts.iter().all(SeriesStationarity::is_stationary);

        if stationary {
            info!("All series stationary after {} differences", order);
            return Ok(DifferencingOutcome {
                frame: current,
                order,
                stationary,
                verdicts,
            });
        }
        if order >= config.max_diff_order {
            let pending: Vec<&str> = verdicts
                .iter()
                .filter(|v| !v.is_stationary())
                .map(|v| v.name.as_str())
                .collect();
            warn!(
                "Series {:?} still non-stationary after {} differences",
                pending, order
            );
            return Ok(DifferencingOutcome {
                frame: current,
                order,
                stationary,
                verdicts,
            });
        }

        order += 1;
        info!("Applying difference order {}", order);
        current = current.difference()?;
    }
}
