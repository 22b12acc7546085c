//! Vector autoregression
//!
//! Lag order selection by information criteria, least squares estimation of
//! a VAR(p) with a constant, stability diagnostics and forecasting.
//!
//! Every equation shares the regressor row `[1, y_{t-1}, .., y_{t-p}]`, so
//! the whole system is one multivariate least squares problem.

pub mod lag_order;
pub mod model;
pub mod result;

#[cfg(test)]
mod tests;

pub use lag_order::{select_order, InformationCriterion, LagScore, LagSelection};
pub use model::{fit_var, Var};
pub use result::{FittedVar, VarSummary};

use serde::Serialize;
use tracing::warn;

use co_core::data::{DataFrame, Month};

use crate::base::{Matrix, ModelError, Result};
use crate::lm::linalg::{inverse_spd, logdet_spd};

/// Numeric columns of a frame as an `n x K` sample
#[derive(Debug, Clone)]
pub(crate) struct VarSample {
    pub names: Vec<String>,
    pub values: Matrix,
    pub months: Option<Vec<Month>>,
}

impl VarSample {
    pub fn from_frame(frame: &DataFrame) -> Result<Self> {
        let names: Vec<String> = frame
            .numeric_column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(ModelError::InvalidConfig {
                message: "a VAR needs at least one numeric column".to_string(),
            });
        }

        let values = frame.numeric_matrix()?;
        let missing = values.iter().filter(|v| v.is_nan()).count();
        if missing > 0 {
            warn!(
                "Sample contains {} missing values, rows touching them are excluded",
                missing
            );
        }

        Ok(Self {
            names,
            values,
            months: frame.months().map(<[Month]>::to_vec),
        })
    }

    pub fn neqs(&self) -> usize {
        self.values.ncols()
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }
}

/// Regressors `Z` (`[1, y_{t-1}, .., y_{t-p}]` per row) and targets `Y` for
/// the target rows `rows`
pub(crate) fn lagged_design(values: &Matrix, rows: &[usize], lags: usize) -> (Matrix, Matrix) {
    let k = values.ncols();
    let mut z = Matrix::zeros((rows.len(), 1 + k * lags));
    let mut y = Matrix::zeros((rows.len(), k));

    for (r, &t) in rows.iter().enumerate() {
        z[[r, 0]] = 1.0;
        for l in 1..=lags {
            for j in 0..k {
                z[[r, 1 + (l - 1) * k + j]] = values[[t - l, j]];
            }
        }
        y.row_mut(r).assign(&values.row(t));
    }
    (z, y)
}

/// Information criteria of one VAR fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InfoCriteria {
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    pub fpe: f64,
}

/// Least squares solution of a VAR(p) system
#[derive(Debug, Clone)]
pub(crate) struct VarEstimate {
    /// `(1 + K p) x K`, one column per equation
    pub params: Matrix,
    pub residuals: Matrix,
    /// `resid' resid / df_resid`
    pub sigma_u: Matrix,
    pub xtx_inv: Matrix,
    pub nobs: usize,
    pub df_resid: usize,
    pub info: InfoCriteria,
}

/// Estimate a VAR(`lags`) on the target rows `rows` of `values`
pub(crate) fn estimate(values: &Matrix, rows: &[usize], lags: usize) -> Result<VarEstimate> {
    let k = values.ncols();
    let nobs = rows.len();
    let df_model = k * lags + 1;
    if nobs <= df_model {
        return Err(ModelError::InsufficientData {
            n_samples: nobs,
            n_predictors: df_model,
        });
    }
    let df_resid = nobs - df_model;

    let (z, y) = lagged_design(values, rows, lags);
    let xtx_inv = inverse_spd(&z.t().dot(&z), "var_estimate")?;
    let params = xtx_inv.dot(&z.t().dot(&y));
    let residuals = &y - &z.dot(&params);

    let sse = residuals.t().dot(&residuals);
    let sigma_u = &sse / df_resid as f64;
    if sigma_u.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::numerical("var_estimate", "non-finite residual covariance"));
    }

    let sigma_mle = &sse / nobs as f64;
    let ld = logdet_spd(&sigma_mle, "var_information_criteria")?;

    let n = nobs as f64;
    let free_params = (lags * k * k + k) as f64;
    let info = InfoCriteria {
        aic: ld + 2.0 * free_params / n,
        bic: ld + n.ln() * free_params / n,
        hqic: ld + 2.0 * n.ln().ln() * free_params / n,
        fpe: ((n + df_model as f64) / df_resid as f64).powi(k as i32) * ld.exp(),
    };

    Ok(VarEstimate {
        params,
        residuals,
        sigma_u,
        xtx_inv,
        nobs,
        df_resid,
        info,
    })
}
