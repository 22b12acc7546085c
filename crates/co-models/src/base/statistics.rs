//! Statistical structures for model results

use serde::{Deserialize, Serialize};

use crate::base::Vector;

/// Fit statistics of one model or one equation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    /// R-squared
    pub r_squared: Option<f64>,
    /// Residual standard error
    pub residual_std_error: Option<f64>,
    /// Log-likelihood
    pub log_likelihood: Option<f64>,
    /// AIC
    pub aic: Option<f64>,
    /// BIC
    pub bic: Option<f64>,
    /// Hannan-Quinn criterion
    pub hqic: Option<f64>,
    /// Final prediction error
    pub fpe: Option<f64>,
    /// Residual degrees of freedom
    pub df_residual: Option<usize>,
    /// Model degrees of freedom
    pub df_model: Option<usize>,
}

/// Residual statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidualStatistics {
    /// Minimum residual
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Maximum residual
    pub max: f64,
    /// Mean residual
    pub mean: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Durbin-Watson statistic
    pub durbin_watson: Option<f64>,
}

impl ResidualStatistics {
    /// Summarize a residual vector
    pub fn from_residuals(residuals: &Vector) -> Self {
        if residuals.is_empty() {
            return Self::default();
        }

        let mut sorted = residuals.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean: residuals.mean().unwrap_or(0.0),
            std_dev: if residuals.len() > 1 { residuals.std(1.0) } else { 0.0 },
            durbin_watson: durbin_watson(residuals),
        }
    }
}

/// Quantile of sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() as f64 - 1.0) * q;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = idx - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Durbin-Watson statistic
fn durbin_watson(residuals: &Vector) -> Option<f64> {
    if residuals.len() < 2 {
        return None;
    }

    let sum_sq_diff: f64 = residuals
        .windows(2)
        .into_iter()
        .map(|w| (w[1] - w[0]).powi(2))
        .sum();
    let sum_sq: f64 = residuals.iter().map(|&r| r * r).sum();

    (sum_sq > 1e-10).then(|| sum_sq_diff / sum_sq)
}
