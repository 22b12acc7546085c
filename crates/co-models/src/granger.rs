//! Pairwise Granger causality
//!
//! For an ordered pair (caused, causing) the restricted regression explains
//! `caused` by its own lags and a constant; the unrestricted one adds the
//! lags of `causing`. Two F statistics compare them: the SSR form and a Wald
//! test on the added coefficients.


use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use co_core::data::DataFrame;

use crate::base::{Matrix, ModelError, Result, Vector};
use crate::lm::{complete_lagged_rows, f_survival, ols, OlsResult};
use crate::var::{FittedVar, VarSample};

/// One F test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FTest {
    pub f_stat: f64,
    pub p_value: f64,
    pub df_num: usize,
    pub df_den: usize,
    pub significant: bool,
}

/// Both F tests for one ordered pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrangerResult {
    pub caused: String,
    pub causing: String,
    pub lag: usize,
    /// Observations in both regressions
    pub nobs: usize,
    pub ssr_ftest: FTest,
    pub params_ftest: FTest,
}

/// Outcome of testing one ordered pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrangerOutcome {
    Tested(GrangerResult),
    Failed {
        caused: String,
        causing: String,
        lag: usize,
        error: String,
    },
}

impl GrangerOutcome {
    pub fn caused(&self) -> &str {
        match self {
            GrangerOutcome::Tested(r) => &r.caused,
            GrangerOutcome::Failed { caused, .. } => caused,
        }
    }

    pub fn causing(&self) -> &str {
        match self {
            GrangerOutcome::Tested(r) => &r.causing,
            GrangerOutcome::Failed { causing, .. } => causing,
        }
    }

    pub fn result(&self) -> Option<&GrangerResult> {
        match self {
            GrangerOutcome::Tested(r) => Some(r),
            GrangerOutcome::Failed { .. } => None,
        }
    }
}

/// Regressors of the restricted and unrestricted equations plus the target.
///
/// Restricted columns: `caused` lags `1..=lag`, constant.
/// Unrestricted columns: `caused` lags, `causing` lags, constant.
pub(crate) fn pair_designs(
    data: &Matrix,
    rows: &[usize],
    caused: usize,
    causing: usize,
    lag: usize,
) -> (Matrix, Matrix, Vector) {
    let n = rows.len();
    let mut restricted = Matrix::zeros((n, lag + 1));
    let mut unrestricted = Matrix::zeros((n, 2 * lag + 1));
    let mut target = Vector::zeros(n);

    for (r, &t) in rows.iter().enumerate() {
        target[r] = data[[t, caused]];
        for l in 1..=lag {
            restricted[[r, l - 1]] = data[[t - l, caused]];
            unrestricted[[r, l - 1]] = data[[t - l, caused]];
            unrestricted[[r, lag + l - 1]] = data[[t - l, causing]];
        }
        restricted[[r, lag]] = 1.0;
        unrestricted[[r, 2 * lag]] = 1.0;
    }
    (restricted, unrestricted, target)
}

/// SSR form of the causality F statistic
pub(crate) fn ssr_f_stat(restricted: &OlsResult, unrestricted: &OlsResult, lag: usize) -> f64 {
    (restricted.ssr - unrestricted.ssr) / unrestricted.ssr / lag as f64 * unrestricted.df_resid as f64
}

/// Runs the pairwise tests at a fixed lag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrangerTester {
    max_lag: usize,
    alpha: f64,
}

impl GrangerTester {
    pub fn new(max_lag: usize, alpha: f64) -> Self {
        Self { max_lag, alpha }
    }

    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Test whether column `causing` Granger-causes column `caused`
    pub fn test_pair(
        &self,
        data: &Matrix,
        names: &[String],
        caused: usize,
        causing: usize,
    ) -> Result<GrangerResult> {
        let lag = self.max_lag;
        if lag == 0 {
            return Err(ModelError::InvalidMaxLag(lag));
        }
        let name = |i: usize| {
            names
                .get(i)
                .cloned()
                .ok_or_else(|| ModelError::UnknownVariable(format!("column {}", i)))
        };
        let (caused_name, causing_name) = (name(caused)?, name(causing)?);
        if caused == causing {
            return Err(ModelError::InvalidConfig {
                message: format!("'{}' cannot be tested against itself", caused_name),
            });
        }

        let (rows, skipped) = complete_lagged_rows(data, &[caused, causing], lag, lag);
        if skipped > 0 {
            debug!(
                "{} -> {}: {} rows excluded because of missing values",
                causing_name, caused_name, skipped
            );
        }

        let (x_r, x_u, y) = pair_designs(data, &rows, caused, causing, lag);
        let restricted = ols(&x_r, &y)?;
        let unrestricted = ols(&x_u, &y)?;
        if unrestricted.ssr <= 0.0 {
            return Err(ModelError::numerical(
                "granger",
                "unrestricted regression fits perfectly",
            ));
        }

        let f_ssr = ssr_f_stat(&restricted, &unrestricted, lag);
        let p_ssr = f_survival(f_ssr, lag, unrestricted.df_resid)?;
        let added: Vec<usize> = (lag..2 * lag).collect();
        let (f_params, p_params, df_num, df_den) = unrestricted.wald_f_test(&added)?;

        Ok(GrangerResult {
            caused: caused_name,
            causing: causing_name,
            lag,
            nobs: rows.len(),
            ssr_ftest: FTest {
                f_stat: f_ssr,
                p_value: p_ssr,
                df_num: lag,
                df_den: unrestricted.df_resid,
                significant: p_ssr < self.alpha,
            },
            params_ftest: FTest {
                f_stat: f_params,
                p_value: p_params,
                df_num,
                df_den,
                significant: p_params < self.alpha,
            },
        })
    }

    /// Test every ordered pair of `names`.
    ///
    /// Pairs are visited with `caused` in the outer loop. A failing pair is
    /// recorded as `Failed` and the batch continues.
    pub fn test_all(&self, data: &Matrix, names: &[String]) -> Result<Vec<GrangerOutcome>> {
        if self.max_lag == 0 {
            return Err(ModelError::InvalidMaxLag(self.max_lag));
        }
        info!(
            "Performing Granger causality tests (max_lag={}, alpha={})",
            self.max_lag, self.alpha
        );

        let mut outcomes = Vec::new();
        for caused in 0..names.len() {
            for causing in 0..names.len() {
                if caused == causing {
                    continue;
                }
                info!("Testing: {} Granger-causes {}?", names[causing], names[caused]);

                let outcome = match self.test_pair(data, names, caused, causing) {
                    Ok(result) => {
                        info!(
                            "ssr_ftest: p-value={:.4} ({}), params_ftest: p-value={:.4} ({})",
                            result.ssr_ftest.p_value,
                            significance_label(result.ssr_ftest.significant),
                            result.params_ftest.p_value,
                            significance_label(result.params_ftest.significant),
                        );
                        GrangerOutcome::Tested(result)
                    }
                    Err(e) => {
                        warn!("Error testing {} -> {}: {}", names[causing], names[caused], e);
                        GrangerOutcome::Failed {
                            caused: names[caused].clone(),
                            causing: names[causing].clone(),
                            lag: self.max_lag,
                            error: e.to_string(),
                        }
                    }
                };
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Test every ordered pair of the variables of a fitted VAR, on its data
    pub fn test_model(&self, model: &FittedVar) -> Result<Vec<GrangerOutcome>> {
        self.test_all(model.data(), model.names())
    }

    /// Test every ordered pair of the numeric columns of a frame
    pub fn test_frame(&self, frame: &DataFrame) -> Result<Vec<GrangerOutcome>> {
        if self.max_lag == 0 {
            return Err(ModelError::InvalidMaxLag(self.max_lag));
        }
        let sample = VarSample::from_frame(frame)?;
        self.test_all(&sample.values, &sample.names)
    }
}

fn significance_label(significant: bool) -> &'static str {
    if significant {
        "Significant"
    } else {
        "Not Significant"
    }
}

// ==================== Summary ====================

/// One printable row per tested pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrangerSummaryRow {
    /// `causing -> caused`
    pub effect: String,
    pub lag: usize,
    pub ssr_p_value: String,
    pub ssr_significant: String,
    pub params_p_value: String,
    pub params_significant: String,
    pub details: String,
}

/// Table of Granger outcomes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrangerSummary {
    pub rows: Vec<GrangerSummaryRow>,
}

/// Format outcomes as summary rows; failed pairs show `Error`
pub fn summarize(outcomes: &[GrangerOutcome]) -> GrangerSummary {
    const ERROR: &str = "Error";

    let rows = outcomes
        .iter()
        .map(|outcome| {
            let effect = format!("{} -> {}", outcome.causing(), outcome.caused());
            match outcome {
                GrangerOutcome::Tested(r) => GrangerSummaryRow {
                    effect,
                    lag: r.lag,
                    ssr_p_value: format!("{:.4}", r.ssr_ftest.p_value),
                    ssr_significant: r.ssr_ftest.significant.to_string(),
                    params_p_value: format!("{:.4}", r.params_ftest.p_value),
                    params_significant: r.params_ftest.significant.to_string(),
                    details: format!(
                        "F={:.2}, df=({}, {})",
                        r.ssr_ftest.f_stat, r.ssr_ftest.df_num, r.ssr_ftest.df_den
                    ),
                },
                GrangerOutcome::Failed { lag, error, .. } => GrangerSummaryRow {
                    effect,
                    lag: *lag,
                    ssr_p_value: ERROR.to_string(),
                    ssr_significant: ERROR.to_string(),
                    params_p_value: ERROR.to_string(),
                    params_significant: ERROR.to_string(),
                    details: error.clone(),
                },
            }
        })
        .collect();

    GrangerSummary { rows }
}

impl fmt::Display for GrangerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effect_width = self
            .rows
            .iter()
            .map(|r| r.effect.len())
            .max()
            .unwrap_or(0)
            .max("Effect".len());

        writeln!(
            f,
            "{:<w$}  {:>4}  {:>11}  {:>15}  {:>14}  {:>18}  {}",
            "Effect",
            "Lag",
            "SSR_p_value",
            "SSR_Significant",
            "Params_p_value",
            "Params_Significant",
            "Details",
            w = effect_width
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<w$}  {:>4}  {:>11}  {:>15}  {:>14}  {:>18}  {}",
                r.effect,
                r.lag,
                r.ssr_p_value,
                r.ssr_significant,
                r.params_p_value,
                r.params_significant,
                r.details,
                w = effect_width
            )?;
        }
        Ok(())
    }
}
