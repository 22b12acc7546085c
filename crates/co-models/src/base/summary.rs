//! Printable equation summaries

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coefficient::Coefficient;
use super::statistics::{ModelStatistics, ResidualStatistics};

/// Which estimator produced an equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Single-equation least squares
    LinearRegression,
    /// One equation of a vector autoregression
    VarEquation,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::LinearRegression => write!(f, "OLS"),
            ModelType::VarEquation => write!(f, "VAR equation"),
        }
    }
}

/// Coefficient table and fit statistics of one equation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_type: ModelType,
    /// `target ~ term + term + ...`
    pub equation: String,
    pub nobs: usize,
    pub coefficients: Vec<Coefficient>,
    pub statistics: ModelStatistics,
    pub residuals: ResidualStatistics,
}

impl ModelSummary {
    /// Dependent variable
    pub fn target(&self) -> &str {
        self.equation.split(" ~ ").next().unwrap_or_default()
    }

    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} ({} observations)", self.model_type, self.equation, self.nobs)?;
        writeln!(
            f,
            "{:<24} {:>12} {:>12} {:>10} {:>10}",
            "Term", "Estimate", "Std Error", "Stat", "p-value"
        )?;
        for c in &self.coefficients {
            writeln!(
                f,
                "{:<24} {:>12.6} {:>12.6} {:>10.3} {:>10.4} {}",
                c.name, c.estimate, c.std_error, c.statistic, c.p_value, c.stars()
            )?;
        }

        let s = &self.statistics;
        if let Some(r2) = s.r_squared {
            writeln!(f, "  R-squared: {:.4}", r2)?;
        }
        if let Some(se) = s.residual_std_error {
            writeln!(f, "  Residual Std. Error: {:.4} on {} DF", se, s.df_residual.unwrap_or(0))?;
        }
        if let Some(dw) = self.residuals.durbin_watson {
            writeln!(f, "  Durbin-Watson: {:.4}", dw)?;
        }
        Ok(())
    }
}
