//! Stationarity screening
//!
//! Augmented Dickey-Fuller (null: unit root) and KPSS (null: level
//! stationarity) tests per series, plus the differencing loop that drives a
//! frame towards stationarity before a VAR is fitted.

pub mod adf;
pub mod differencing;
pub mod kpss;
mod mackinnon;

#[cfg(test)]
mod tests;

pub use adf::{adf, adf_test, AdfStatistic};
pub use differencing::{apply_differencing, difference_until_stationary, Differencing, DifferencingOutcome};
pub use kpss::{kpss, kpss_test, KpssStatistic};

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use co_core::data::{is_missing, DataFrame, TimeSeries};

use crate::base::Result;

/// Default significance level of both tests
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Which procedure produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    #[serde(rename = "ADF")]
    Adf,
    #[serde(rename = "KPSS")]
    Kpss,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Adf => write!(f, "ADF"),
            TestKind::Kpss => write!(f, "KPSS"),
        }
    }
}

/// Decision of one test on one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityVerdict {
    pub test: TestKind,
    pub is_stationary: bool,
    pub p_value: f64,
    /// `None` when the statistic was not computed
    pub statistic: Option<f64>,
    pub lags: Option<usize>,
    /// Observations after dropping missing values
    pub nobs: usize,
    /// Critical values keyed by level, e.g. `"5%"`
    pub critical_values: IndexMap<String, f64>,
    /// Why the statistic was skipped or replaced
    pub note: Option<String>,
}

impl StationarityVerdict {
    /// Verdict that did not come from a computed statistic
    pub(crate) fn fallback(
        test: TestKind,
        is_stationary: bool,
        p_value: f64,
        nobs: usize,
        note: impl Into<String>,
    ) -> Self {
        Self {
            test,
            is_stationary,
            p_value,
            statistic: None,
            lags: None,
            nobs,
            critical_values: IndexMap::new(),
            note: Some(note.into()),
        }
    }
}

/// Significance levels and the differencing budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationarityConfig {
    pub adf_alpha: f64,
    pub kpss_alpha: f64,
    /// Largest number of first differences `difference_until_stationary` applies
    pub max_diff_order: usize,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            adf_alpha: DEFAULT_ALPHA,
            kpss_alpha: DEFAULT_ALPHA,
            max_diff_order: 2,
        }
    }
}

/// Both verdicts for one named series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStationarity {
    pub name: String,
    pub adf: StationarityVerdict,
    pub kpss: StationarityVerdict,
}

impl SeriesStationarity {
    /// Stationary when ADF rejects a unit root and KPSS does not reject stationarity
    pub fn is_stationary(&self) -> bool {
        self.adf.is_stationary && self.kpss.is_stationary
    }
}

/// Non-missing values of a slice, in order
pub(crate) fn present(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !is_missing(*v)).collect()
}

/// Run ADF and KPSS on one series
pub fn check_stationarity(series: &TimeSeries, config: &StationarityConfig) -> SeriesStationarity {
    check_values(series.name(), &series.present_values(), config)
}

fn check_values(name: &str, values: &[f64], config: &StationarityConfig) -> SeriesStationarity {
    let adf = adf_test(values, config.adf_alpha);
    let kpss = kpss_test(values, config.kpss_alpha);
    info!(
        "{}: ADF p={:.4} ({}), KPSS p={:.4} ({})",
        name,
        adf.p_value,
        if adf.is_stationary { "stationary" } else { "non-stationary" },
        kpss.p_value,
        if kpss.is_stationary { "stationary" } else { "non-stationary" },
    );
    if adf.is_stationary != kpss.is_stationary {
        warn!("ADF and KPSS disagree on '{}'", name);
    }

    SeriesStationarity {
        name: name.to_string(),
        adf,
        kpss,
    }
}

/// Run both tests on every numeric column of a frame
pub fn check_frame(frame: &DataFrame, config: &StationarityConfig) -> Result<Vec<SeriesStationarity>> {
    frame
        .iter_columns()
        .filter(|(_, s)| s.is_numeric())
        .map(|(name, s)| -> Result<SeriesStationarity> {
            let values = s.to_float_array()?;
            Ok(check_values(name, &present(&values.to_vec()), config))
        })
        .collect()
}
