//! VAR model builder

use tracing::{info, warn};

use co_core::data::DataFrame;

use super::result::FittedVar;
use super::{estimate, VarSample};
use crate::base::{ModelError, Result};
use crate::lm::complete_lagged_rows;

// ==================== VAR Model ====================

/// Vector autoregression with a constant
#[derive(Debug, Clone)]
pub struct Var {
    /// Lag order p
    lag_order: usize,
    /// Data
    data: Option<DataFrame>,
    /// Fitted result
    result: Option<FittedVar>,
}

impl Var {
    /// A VAR(`lag_order`) model awaiting data
    pub fn new(lag_order: usize) -> Self {
        Self {
            lag_order,
            data: None,
            result: None,
        }
    }

    /// Set data for the model; every numeric column becomes an equation
    pub fn data(mut self, data: &DataFrame) -> Self {
        self.data = Some(data.clone());
        self.result = None;
        self
    }

    pub fn lag_order(&self) -> usize {
        self.lag_order
    }

    /// Fit the model by least squares, equation by equation
    pub fn fit(mut self) -> Result<Self> {
        if self.lag_order == 0 {
            return Err(ModelError::InvalidLagOrder(self.lag_order));
        }
        let data = self.data.as_ref().ok_or_else(|| ModelError::InvalidConfig {
            message: "No data provided".to_string(),
        })?;

        let sample = VarSample::from_frame(data)?;
        let p = self.lag_order;
        let columns: Vec<usize> = (0..sample.neqs()).collect();
        let (rows, skipped) = complete_lagged_rows(&sample.values, &columns, p, p);
        if skipped > 0 {
            warn!("{} rows excluded from the VAR fit because of missing values", skipped);
        }

        info!(
            "Fitting VAR({}) on {} observations of {:?}",
            p,
            rows.len(),
            sample.names
        );
        let estimate = estimate(&sample.values, &rows, p)?;
        let fitted = FittedVar::new(sample, p, estimate)?;

        if !fitted.is_stable() {
            warn!("Fitted VAR({}) is not stable", p);
        }
        self.result = Some(fitted);
        Ok(self)
    }

    /// Fitted result
    pub fn results(&self) -> Result<&FittedVar> {
        self.result.as_ref().ok_or(ModelError::NotFitted)
    }

    pub fn into_results(self) -> Result<FittedVar> {
        self.result.ok_or(ModelError::NotFitted)
    }
}

/// Fit a VAR(`lag_order`) on the numeric columns of `frame`
pub fn fit_var(frame: &DataFrame, lag_order: usize) -> Result<FittedVar> {
    Var::new(lag_order).data(frame).fit()?.into_results()
}
