//! Ordinary Least Squares (OLS) regression
//!
//! The single-equation estimator behind the Dickey-Fuller regressions and the
//! restricted/unrestricted pairs of the causality tests.

use ndarray::Axis;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use super::linalg::inverse_spd;
use crate::base::{
    Coefficient, Matrix, ModelError, ModelStatistics, ModelSummary, ModelType,
    ResidualStatistics, Result, Vector,
};

// ==================== OLS Result ====================

/// Fitted OLS regression
#[derive(Debug, Clone, Serialize)]
pub struct OlsResult {
    /// Coefficients, in design-matrix column order
    pub params: Vector,
    /// Residuals
    pub residuals: Vector,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
    /// Residual degrees of freedom, `nobs - k`
    pub df_resid: usize,
    /// `(X'X)^{-1}`
    #[serde(skip)]
    pub xtx_inv: Matrix,
    /// Total sum of squares around the mean of `y`
    pub centered_tss: f64,
}

/// Fit `y = X b + e` by least squares
pub fn ols(x: &Matrix, y: &Vector) -> Result<OlsResult> {
    let n = x.nrows();
    let k = x.ncols();

    if y.len() != n {
        return Err(ModelError::numerical(
            "ols",
            format!("design has {} rows but response has {}", n, y.len()),
        ));
    }
    if n <= k {
        return Err(ModelError::InsufficientData {
            n_samples: n,
            n_predictors: k,
        });
    }

    let xtx_inv = inverse_spd(&x.t().dot(x), "ols")?;
    let params = xtx_inv.dot(&x.t().dot(y));

    let fitted = x.dot(&params);
    let residuals = y - &fitted;
    let ssr = residuals.mapv(|r| r * r).sum();

    let y_mean = y.mean().unwrap_or(0.0);
    let centered_tss = y.iter().map(|&v| (v - y_mean).powi(2)).sum();

    if !ssr.is_finite() {
        return Err(ModelError::numerical("ols", "non-finite residual sum of squares"));
    }

    Ok(OlsResult {
        params,
        residuals,
        ssr,
        nobs: n,
        df_resid: n - k,
        xtx_inv,
        centered_tss,
    })
}

impl OlsResult {
    /// Number of estimated coefficients
    pub fn n_params(&self) -> usize {
        self.params.len()
    }

    /// Residual variance `ssr / df_resid`
    pub fn sigma2(&self) -> f64 {
        self.ssr / self.df_resid as f64
    }

    /// Classical standard errors, `sqrt(diag(s^2 (X'X)^{-1}))`
    pub fn standard_errors(&self) -> Vector {
        let sigma2 = self.sigma2();
        self.xtx_inv.diag().mapv(|v| (sigma2 * v).max(0.0).sqrt())
    }

    pub fn t_values(&self) -> Vector {
        &self.params / &self.standard_errors()
    }

    /// Two-sided p-values from Student's t with `df_resid` degrees of freedom
    pub fn p_values(&self) -> Result<Vector> {
        let t_dist = StudentsT::new(0.0, 1.0, self.df_resid as f64)
            .map_err(|e| ModelError::numerical("p_values", e.to_string()))?;

        Ok(self
            .t_values()
            .mapv(|t| (2.0 * (1.0 - t_dist.cdf(t.abs()))).clamp(0.0, 1.0)))
    }

    /// Gaussian log-likelihood at the ML variance `ssr / n`
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// `-2 llf + 2 k`, `k` counting every coefficient
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params() as f64
    }

    /// `-2 llf + ln(n) k`
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + (self.nobs as f64).ln() * self.n_params() as f64
    }

    pub fn r_squared(&self) -> Option<f64> {
        (self.centered_tss > 0.0).then(|| 1.0 - self.ssr / self.centered_tss)
    }

    /// Wald F test that the coefficients at `restricted` are jointly zero.
    ///
    /// Returns `(F, p_value, df_num, df_den)`.
    pub fn wald_f_test(&self, restricted: &[usize]) -> Result<(f64, f64, usize, usize)> {
        if restricted.is_empty() {
            return Err(ModelError::InvalidConfig {
                message: "Wald test needs at least one restriction".to_string(),
            });
        }
        if let Some(&bad) = restricted.iter().find(|&&i| i >= self.n_params()) {
            return Err(ModelError::InvalidConfig {
                message: format!("restriction on coefficient {} of {}", bad, self.n_params()),
            });
        }

        let q = restricted.len();
        let b = self.params.select(Axis(0), restricted);
        let cov = self
            .xtx_inv
            .select(Axis(0), restricted)
            .select(Axis(1), restricted)
            * self.sigma2();
        let cov_inv = inverse_spd(&cov, "wald_f_test")?;

        let f_value = b.dot(&cov_inv.dot(&b)) / q as f64;
        let p_value = f_survival(f_value, q, self.df_resid)?;
        Ok((f_value, p_value, q, self.df_resid))
    }

    /// Coefficient table with t statistics
    pub fn to_coefficients(&self, names: &[String]) -> Result<Vec<Coefficient>> {
        let se = self.standard_errors();
        let t = self.t_values();
        let p = self.p_values()?;

        Ok((0..self.n_params())
            .map(|i| {
                let name = names.get(i).cloned().unwrap_or_else(|| format!("x{}", i));
                Coefficient::new(name, self.params[i], se[i], t[i], p[i])
            })
            .collect())
    }

    /// Summary of the regression of `target` on `names`
    pub fn summary(&self, target: &str, names: &[String]) -> Result<ModelSummary> {
        Ok(ModelSummary {
            model_type: ModelType::LinearRegression,
            equation: format!("{} ~ {}", target, names.join(" + ")),
            nobs: self.nobs,
            coefficients: self.to_coefficients(names)?,
            statistics: ModelStatistics {
                r_squared: self.r_squared(),
                residual_std_error: Some(self.sigma2().sqrt()),
                log_likelihood: Some(self.log_likelihood()),
                aic: Some(self.aic()),
                bic: Some(self.bic()),
                df_residual: Some(self.df_resid),
                df_model: Some(self.n_params().saturating_sub(1)),
                ..ModelStatistics::default()
            },
            residuals: ResidualStatistics::from_residuals(&self.residuals),
        })
    }
}

/// Upper tail of F(df_num, df_den) at `f_value`
pub(crate) fn f_survival(f_value: f64, df_num: usize, df_den: usize) -> Result<f64> {
    let f_dist = FisherSnedecor::new(df_num as f64, df_den as f64)
        .map_err(|e| ModelError::numerical("f_survival", e.to_string()))?;
    Ok(f_dist.sf(f_value.max(0.0)))
}
