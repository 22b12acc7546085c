//! Out-of-sample checks of fitted relationships
//!
//! Rolling-origin forecast evaluation of the VAR and a residual bootstrap of
//! the Granger SSR F statistic under the no-causality model.


use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::Serialize;
use tracing::{debug, info, warn};

use co_core::data::DataFrame;

use crate::base::{ModelError, Result, Vector};
use crate::granger::{pair_designs, ssr_f_stat};
use crate::lm::{complete_lagged_rows, ols};
use crate::var::{fit_var, VarSample};

// ==================== Rolling Origin ====================

/// Forecast accuracy over rolling estimation windows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingOriginReport {
    pub lag: usize,
    pub window: usize,
    pub horizon: usize,
    /// Origins whose fit and forecast succeeded
    pub origins: usize,
    /// Origins skipped because the fit failed or the data had gaps
    pub skipped: usize,
    pub rmse: IndexMap<String, f64>,
    pub mae: IndexMap<String, f64>,
}

/// Refit a VAR(`lag`) on each window of `window` rows and score its
/// `horizon`-step forecasts against the rows that follow.
pub fn rolling_origin(
    frame: &DataFrame,
    lag: usize,
    window: usize,
    horizon: usize,
) -> Result<RollingOriginReport> {
    if lag == 0 {
        return Err(ModelError::InvalidLagOrder(lag));
    }
    if horizon == 0 || window <= lag {
        return Err(ModelError::InvalidConfig {
            message: format!(
                "rolling origin needs horizon >= 1 and window > lag (window={}, lag={}, horizon={})",
                window, lag, horizon
            ),
        });
    }

    let sample = VarSample::from_frame(frame)?;
    let n = sample.nrows();
    if n < window + horizon {
        return Err(ModelError::InsufficientData {
            n_samples: n,
            n_predictors: window + horizon,
        });
    }

    let k = sample.neqs();
    let mut sq = Vector::zeros(k);
    let mut abs = Vector::zeros(k);
    let mut count = 0usize;
    let mut origins = 0usize;
    let mut skipped = 0usize;

    for start in 0..=n - window - horizon {
        let train = frame.slice_rows(start..start + window)?;
        let forecast = match fit_var(&train, lag).and_then(|m| m.forecast(horizon)) {
            Ok(f) => f,
            Err(e) => {
                debug!("Origin {} skipped: {}", start + window, e);
                skipped += 1;
                continue;
            }
        };

        let actual = sample
            .values
            .slice(ndarray::s![start + window..start + window + horizon, ..]);
        if actual.iter().any(|v| v.is_nan()) {
            skipped += 1;
            continue;
        }

        let err = &actual - &forecast;
        for row in err.rows() {
            sq = sq + row.mapv(|e| e * e);
            abs = abs + row.mapv(f64::abs);
            count += 1;
        }
        origins += 1;
    }

    if origins == 0 {
        return Err(ModelError::numerical(
            "rolling_origin",
            "no forecast origin could be evaluated",
        ));
    }
    if skipped > 0 {
        warn!("{} of {} forecast origins skipped", skipped, origins + skipped);
    }

    let rmse: IndexMap<String, f64> = sample
        .names
        .iter()
        .zip(sq.iter())
        .map(|(name, s)| (name.clone(), (s / count as f64).sqrt()))
        .collect();
    let mae: IndexMap<String, f64> = sample
        .names
        .iter()
        .zip(abs.iter())
        .map(|(name, a)| (name.clone(), a / count as f64))
        .collect();

    info!(
        "Rolling-origin evaluation over {} origins: RMSE {:?}",
        origins, rmse
    );
    Ok(RollingOriginReport {
        lag,
        window,
        horizon,
        origins,
        skipped,
        rmse,
        mae,
    })
}

// ==================== Bootstrap ====================

/// Bootstrap distribution summary of the Granger SSR F statistic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapResult {
    pub caused: String,
    pub causing: String,
    pub lag: usize,
    pub iterations: usize,
    /// Draws whose regressions could not be evaluated
    pub failed: usize,
    pub nobs: usize,
    pub observed_f: f64,
    /// `(1 + #{F* >= F}) / (iterations - failed + 1)`
    pub p_value: f64,
}

/// Share of evaluated draws at least as extreme as the observed statistic,
/// counting the observed sample as one draw
fn bootstrap_p_value(exceed: usize, evaluated: usize) -> f64 {
    (1 + exceed) as f64 / (evaluated + 1) as f64
}

/// Residual bootstrap of the test that `causing` Granger-causes `caused`.
///
/// Responses are rebuilt from the restricted fit plus resampled, centered
/// restricted residuals on the observed regressors, so every draw satisfies
/// the null. The same `seed` always gives the same p-value.
pub fn bootstrap_granger(
    frame: &DataFrame,
    caused: &str,
    causing: &str,
    lag: usize,
    iterations: usize,
    seed: u64,
) -> Result<BootstrapResult> {
    if lag == 0 {
        return Err(ModelError::InvalidMaxLag(lag));
    }
    if iterations == 0 {
        return Err(ModelError::InvalidConfig {
            message: "bootstrap needs at least one iteration".to_string(),
        });
    }

    let sample = VarSample::from_frame(frame)?;
    let index = |name: &str| {
        sample
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))
    };
    let (ci, xi) = (index(caused)?, index(causing)?);

    let (rows, _) = complete_lagged_rows(&sample.values, &[ci, xi], lag, lag);
    let (x_r, x_u, y) = pair_designs(&sample.values, &rows, ci, xi, lag);
    let restricted = ols(&x_r, &y)?;
    let unrestricted = ols(&x_u, &y)?;
    let observed_f = ssr_f_stat(&restricted, &unrestricted, lag);

    let fitted = x_r.dot(&restricted.params);
    let resid_mean = restricted.residuals.mean().unwrap_or(0.0);
    let centered = restricted.residuals.mapv(|e| e - resid_mean);

    let n = rows.len();
    let pick = Uniform::new(0, n).map_err(|e| ModelError::numerical("bootstrap_granger", e.to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);

    info!(
        "Bootstrapping {} -> {} at lag {} with {} iterations",
        causing, caused, lag, iterations
    );
    let mut exceed = 0usize;
    let mut failed = 0usize;
    for _ in 0..iterations {
        let y_star = &fitted + &Vector::from_shape_fn(n, |_| centered[pick.sample(&mut rng)]);
        let stat = ols(&x_r, &y_star)
            .and_then(|r| ols(&x_u, &y_star).map(|u| ssr_f_stat(&r, &u, lag)));
        match stat {
            Ok(f) if f >= observed_f => exceed += 1,
            Ok(_) => {}
            Err(_) => failed += 1,
        }
    }
    if failed == iterations {
        return Err(ModelError::numerical(
            "bootstrap_granger",
            "no bootstrap draw could be evaluated",
        ));
    }
    if failed > 0 {
        warn!("{} of {} bootstrap draws could not be evaluated", failed, iterations);
    }

    let p_value = bootstrap_p_value(exceed, iterations - failed);
    debug!("Bootstrap p-value {:.4} (observed F={:.4})", p_value, observed_f);

    Ok(BootstrapResult {
        caused: caused.to_string(),
        causing: causing.to_string(),
        lag,
        iterations,
        failed,
        nobs: n,
        observed_f,
        p_value,
    })
}
