//! Augmented Dickey-Fuller test with a constant
//!
//! The lag length is chosen by AIC on a common sample that holds back the
//! largest candidate lag, then the chosen regression is refitted on every
//! observation it can use.

use indexmap::IndexMap;
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, warn};

use super::mackinnon::{mackinnon_crit, mackinnon_p};
use super::{present, StationarityVerdict, TestKind};
use crate::base::{ModelError, Result, Vector};
use crate::lm::ols;

/// Raw ADF regression output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfStatistic {
    /// t statistic of the lagged level
    pub statistic: f64,
    pub p_value: f64,
    /// Lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    pub critical_values: IndexMap<String, f64>,
    /// AIC of the chosen lag on the selection sample
    pub ic_best: f64,
}

/// Default upper bound of the lag search, `ceil(12 (n/100)^(1/4))` capped at `n/2 - 2`
pub fn default_max_lag(nobs: usize) -> Result<usize> {
    let schwert = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as i64;
    let cap = (nobs / 2) as i64 - 2;
    let maxlag = schwert.min(cap);
    if maxlag < 0 {
        return Err(ModelError::InsufficientData {
            n_samples: nobs,
            n_predictors: 2,
        });
    }
    Ok(maxlag as usize)
}

/// Dickey-Fuller design over `rows` target positions of `dx`.
///
/// Columns are `[level, dx lag 1, .., dx lag lags]`; `rows` counts back from
/// the end of `dx`.
fn df_design(x: &[f64], dx: &[f64], lags: usize, rows: usize, constant_first: bool) -> (Array2<f64>, Vector) {
    let offset = dx.len() - rows;
    let k = lags + 2;
    let mut design = Array2::zeros((rows, k));
    let mut target = Vector::zeros(rows);

    for r in 0..rows {
        let j = offset + r;
        let shift = usize::from(constant_first);
        if constant_first {
            design[[r, 0]] = 1.0;
        } else {
            design[[r, k - 1]] = 1.0;
        }
        design[[r, shift]] = x[j];
        for i in 1..=lags {
            design[[r, shift + i]] = dx[j - i];
        }
        target[r] = dx[j];
    }
    (design, target)
}

/// Run the ADF regression on `values` (missing values are dropped)
pub fn adf(values: &[f64]) -> Result<AdfStatistic> {
    let x = present(values);
    let nobs = x.len();

    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        return Err(ModelError::numerical("adf", "series is constant"));
    }

    let maxlag = default_max_lag(nobs)?;
    let dx: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // Lag selection on the sample the largest lag allows
    let sample = dx.len().saturating_sub(maxlag);
    let (full, target) = df_design(&x, &dx, maxlag, sample, true);

    let mut best: Option<(f64, usize)> = None;
    for lags in 0..=maxlag {
        let columns = full.slice(ndarray::s![.., ..lags + 2]).to_owned();
        let aic = match ols(&columns, &target) {
            Ok(fit) => fit.aic(),
            Err(e) => {
                debug!("ADF lag {} skipped: {}", lags, e);
                continue;
            }
        };
        if best.map_or(true, |(b, _)| aic < b) {
            best = Some((aic, lags));
        }
    }
    let (ic_best, used_lag) =
        best.ok_or_else(|| ModelError::numerical("adf", "no lag length could be estimated"))?;

    let rows = dx.len() - used_lag;
    let (design, target) = df_design(&x, &dx, used_lag, rows, false);
    let fit = ols(&design, &target)?;
    let statistic = fit.t_values()[0];
    if !statistic.is_finite() {
        return Err(ModelError::numerical("adf", "non-finite test statistic"));
    }

    Ok(AdfStatistic {
        statistic,
        p_value: mackinnon_p(statistic),
        used_lag,
        nobs: rows,
        critical_values: mackinnon_crit(rows),
        ic_best,
    })
}

/// ADF verdict at level `alpha`; a failed regression counts as non-stationary
pub fn adf_test(values: &[f64], alpha: f64) -> StationarityVerdict {
    let nobs = present(values).len();
    match adf(values) {
        Ok(stat) => {
            debug!(
                "ADF statistic {:.4} with {} lags on {} observations",
                stat.statistic, stat.used_lag, stat.nobs
            );
            StationarityVerdict {
                test: TestKind::Adf,
                is_stationary: stat.p_value < alpha,
                p_value: stat.p_value,
                statistic: Some(stat.statistic),
                lags: Some(stat.used_lag),
                nobs: stat.nobs,
                critical_values: stat.critical_values,
                note: None,
            }
        }
        Err(e) => {
            warn!("ADF test failed: {}", e);
            StationarityVerdict::fallback(TestKind::Adf, false, 1.0, nobs, e.to_string())
        }
    }
}
