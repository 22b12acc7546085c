//! Fitted VAR results

use std::fmt;

use nalgebra::Complex;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use co_core::data::Month;

use super::{InfoCriteria, VarEstimate, VarSample};
use crate::base::{
    Coefficient, Matrix, INTERCEPT, ModelError, ModelStatistics, ModelSummary, ModelType,
    ResidualStatistics, Result, Vector,
};
use crate::lm::linalg::to_dmatrix;

/// A VAR(p) with a constant, estimated by least squares.
///
/// Immutable once built; `coefs()[l][[i, j]]` is the effect of variable `j`
/// at lag `l + 1` on equation `i`.
#[derive(Debug, Clone)]
pub struct FittedVar {
    names: Vec<String>,
    lag_order: usize,
    intercept: Vector,
    coefs: Vec<Matrix>,
    params: Matrix,
    residuals: Matrix,
    sigma_u: Matrix,
    xtx_inv: Matrix,
    nobs: usize,
    df_resid: usize,
    info: InfoCriteria,
    data: Matrix,
    months: Option<Vec<Month>>,
    eigenvalues: Vec<Complex<f64>>,
}

impl FittedVar {
    pub(crate) fn new(sample: VarSample, lag_order: usize, estimate: VarEstimate) -> Result<Self> {
        let k = sample.neqs();
        let params = estimate.params;

        let intercept = params.row(0).to_owned();
        let coefs: Vec<Matrix> = (0..lag_order)
            .map(|l| {
                let block = params.slice(ndarray::s![1 + l * k..1 + (l + 1) * k, ..]);
                block.t().to_owned()
            })
            .collect();

        let eigenvalues = companion_eigenvalues(&coefs, k)?;

        Ok(Self {
            names: sample.names,
            lag_order,
            intercept,
            coefs,
            params,
            residuals: estimate.residuals,
            sigma_u: estimate.sigma_u,
            xtx_inv: estimate.xtx_inv,
            nobs: estimate.nobs,
            df_resid: estimate.df_resid,
            info: estimate.info,
            data: sample.values,
            months: sample.months,
            eigenvalues,
        })
    }

    /// Variable names in equation order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn neqs(&self) -> usize {
        self.names.len()
    }

    pub fn lag_order(&self) -> usize {
        self.lag_order
    }

    pub fn intercept(&self) -> &Vector {
        &self.intercept
    }

    /// One `K x K` matrix per lag
    pub fn coefs(&self) -> &[Matrix] {
        &self.coefs
    }

    /// Stacked coefficients, `(1 + K p) x K`, one column per equation
    pub fn params(&self) -> &Matrix {
        &self.params
    }

    pub fn residuals(&self) -> &Matrix {
        &self.residuals
    }

    /// Residual covariance with the degrees-of-freedom correction
    pub fn sigma_u(&self) -> &Matrix {
        &self.sigma_u
    }

    /// Observations used in the estimation
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn df_resid(&self) -> usize {
        self.df_resid
    }

    pub fn info_criteria(&self) -> &InfoCriteria {
        &self.info
    }

    /// The full `n x K` sample the model was fitted on
    pub fn data(&self) -> &Matrix {
        &self.data
    }

    pub fn months(&self) -> Option<&[Month]> {
        self.months.as_deref()
    }

    // ==================== Stability ====================

    /// Eigenvalues of the companion matrix
    pub fn eigenvalues(&self) -> &[Complex<f64>] {
        &self.eigenvalues
    }

    /// Roots of the characteristic polynomial, the inverse eigenvalues
    pub fn roots(&self) -> Vec<Complex<f64>> {
        self.eigenvalues
            .iter()
            .map(|ev| Complex::new(1.0, 0.0) / ev)
            .collect()
    }

    /// Every companion eigenvalue lies strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.eigenvalues.iter().all(|ev| ev.norm() < 1.0)
    }

    // ==================== Inference ====================

    /// Standard errors shaped like `params`
    pub fn std_errors(&self) -> Matrix {
        let diag = self.xtx_inv.diag();
        Matrix::from_shape_fn(self.params.dim(), |(i, j)| {
            (self.sigma_u[[j, j]] * diag[i]).max(0.0).sqrt()
        })
    }

    pub fn z_values(&self) -> Matrix {
        &self.params / &self.std_errors()
    }

    /// Two-sided normal p-values shaped like `params`
    pub fn p_values(&self) -> Result<Matrix> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ModelError::numerical("var_p_values", e.to_string()))?;
        Ok(self
            .z_values()
            .mapv(|z| (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0)))
    }

    /// Regressor names: `const`, then `L<lag>.<name>`
    pub fn term_names(&self) -> Vec<String> {
        std::iter::once(INTERCEPT.to_string())
            .chain((1..=self.lag_order).flat_map(|l| {
                self.names.iter().map(move |n| format!("L{}.{}", l, n))
            }))
            .collect()
    }

    /// Per-equation coefficient tables and system criteria
    pub fn summary(&self) -> Result<VarSummary> {
        let terms = self.term_names();
        let se = self.std_errors();
        let z = self.z_values();
        let p = self.p_values()?;

        let equations = self
            .names
            .iter()
            .enumerate()
            .map(|(eq, name)| {
                let coefficients = terms
                    .iter()
                    .enumerate()
                    .map(|(i, term)| {
                        Coefficient::new(
                            term.clone(),
                            self.params[[i, eq]],
                            se[[i, eq]],
                            z[[i, eq]],
                            p[[i, eq]],
                        )
                    })
                    .collect();

                let resid = self.residuals.column(eq).to_owned();
                ModelSummary {
                    model_type: ModelType::VarEquation,
                    equation: format!("{} ~ {}", name, terms.join(" + ")),
                    nobs: self.nobs,
                    coefficients,
                    statistics: ModelStatistics {
                        residual_std_error: Some(self.sigma_u[[eq, eq]].sqrt()),
                        aic: Some(self.info.aic),
                        bic: Some(self.info.bic),
                        hqic: Some(self.info.hqic),
                        fpe: Some(self.info.fpe),
                        df_residual: Some(self.df_resid),
                        df_model: Some(terms.len() - 1),
                        ..ModelStatistics::default()
                    },
                    residuals: ResidualStatistics::from_residuals(&resid),
                }
            })
            .collect();

        Ok(VarSummary {
            lag_order: self.lag_order,
            nobs: self.nobs,
            variables: self.names.clone(),
            info_criteria: self.info,
            is_stable: self.is_stable(),
            eigenvalue_moduli: self.eigenvalues.iter().map(|ev| ev.norm()).collect(),
            residual_covariance: self.sigma_u.rows().into_iter().map(|r| r.to_vec()).collect(),
            equations,
        })
    }

    // ==================== Forecasting ====================

    /// Forecast `steps` months past the end of the fitted sample
    pub fn forecast(&self, steps: usize) -> Result<Matrix> {
        self.forecast_from(&self.data, steps)
    }

    /// Forecast `steps` months past the last `p` rows of `history`
    pub fn forecast_from(&self, history: &Matrix, steps: usize) -> Result<Matrix> {
        let k = self.neqs();
        let p = self.lag_order;
        if history.ncols() != k {
            return Err(ModelError::numerical(
                "forecast",
                format!("history has {} columns, model has {} variables", history.ncols(), k),
            ));
        }
        if history.nrows() < p {
            return Err(ModelError::InsufficientData {
                n_samples: history.nrows(),
                n_predictors: p,
            });
        }

        // lags[0] is the most recent observation
        let mut lags: Vec<Vector> = (0..p)
            .map(|l| history.row(history.nrows() - 1 - l).to_owned())
            .collect();
        if lags.iter().any(|row| row.iter().any(|v| v.is_nan())) {
            return Err(ModelError::numerical("forecast", "history ends with missing values"));
        }

        let mut out = Matrix::zeros((steps, k));
        for h in 0..steps {
            let mut next = self.intercept.clone();
            for (a, lagged) in self.coefs.iter().zip(&lags) {
                next = next + a.dot(lagged);
            }
            out.row_mut(h).assign(&next);
            lags.rotate_right(1);
            lags[0] = next;
        }
        Ok(out)
    }
}

/// Eigenvalues of the `Kp x Kp` companion matrix `[A_1 .. A_p; I 0]`
fn companion_eigenvalues(coefs: &[Matrix], k: usize) -> Result<Vec<Complex<f64>>> {
    let dim = k * coefs.len();
    let mut companion = Matrix::zeros((dim, dim));
    for (l, a) in coefs.iter().enumerate() {
        companion
            .slice_mut(ndarray::s![0..k, l * k..(l + 1) * k])
            .assign(a);
    }
    for i in k..dim {
        companion[[i, i - k]] = 1.0;
    }

    if companion.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::numerical("companion_eigenvalues", "non-finite coefficients"));
    }
    Ok(to_dmatrix(&companion).complex_eigenvalues().iter().copied().collect())
}

/// Serializable view of a fitted VAR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarSummary {
    pub lag_order: usize,
    pub nobs: usize,
    pub variables: Vec<String>,
    pub info_criteria: InfoCriteria,
    pub is_stable: bool,
    /// Moduli of the companion eigenvalues
    pub eigenvalue_moduli: Vec<f64>,
    pub residual_covariance: Vec<Vec<f64>>,
    pub equations: Vec<ModelSummary>,
}

impl fmt::Display for VarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "VAR({}) on {} observations", self.lag_order, self.nobs)?;
        writeln!(f, "Variables: {}", self.variables.join(", "))?;
        writeln!(
            f,
            "AIC: {:.4}  BIC: {:.4}  HQIC: {:.4}  FPE: {:.4e}",
            self.info_criteria.aic,
            self.info_criteria.bic,
            self.info_criteria.hqic,
            self.info_criteria.fpe
        )?;
        writeln!(f, "Stable: {}", if self.is_stable { "yes" } else { "no" })?;
        for eq in &self.equations {
            writeln!(f)?;
            write!(f, "{}", eq)?;
        }
        Ok(())
    }
}
