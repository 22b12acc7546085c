//! KPSS test for level stationarity
//!
//! Residuals are deviations from the mean; the long-run variance uses a
//! Bartlett kernel with the Hobijn et al. (1998) automatic bandwidth.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{present, StationarityVerdict, TestKind};
use crate::base::{ModelError, Result};

/// Sample variance below which a series counts as constant
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-10;

/// Level-stationarity critical values with their tail probabilities
const CRITICAL_VALUES: [(f64, f64, &str); 4] = [
    (0.347, 0.10, "10%"),
    (0.463, 0.05, "5%"),
    (0.574, 0.025, "2.5%"),
    (0.739, 0.01, "1%"),
];

/// Raw KPSS output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpssStatistic {
    pub statistic: f64,
    /// Interpolated from the critical table, clamped to `[0.01, 0.10]`
    pub p_value: f64,
    /// Bartlett bandwidth
    pub lags: usize,
    pub nobs: usize,
    pub critical_values: IndexMap<String, f64>,
}

fn autocovariance_sum(resid: &[f64], lag: usize) -> f64 {
    resid[lag..]
        .iter()
        .zip(&resid[..resid.len() - lag])
        .map(|(a, b)| a * b)
        .sum()
}

/// Automatic bandwidth of Hobijn, Franses and Ooms (1998)
fn auto_lag(resid: &[f64]) -> usize {
    let n = resid.len();
    let covlags = (n as f64).powf(2.0 / 9.0) as usize;

    let mut s0 = resid.iter().map(|e| e * e).sum::<f64>() / n as f64;
    let mut s1 = 0.0;
    for i in 1..=covlags.min(n - 1) {
        let prod = autocovariance_sum(resid, i) / (n as f64 / 2.0);
        s0 += prod;
        s1 += i as f64 * prod;
    }

    let ratio = s1 / s0;
    let gamma = 1.1447 * (ratio * ratio).powf(1.0 / 3.0);
    let lags = (gamma * (n as f64).powf(1.0 / 3.0)) as usize;
    lags.min(n - 1)
}

/// Long-run variance with Bartlett weights `1 - i/(lags+1)`
fn long_run_variance(resid: &[f64], lags: usize) -> f64 {
    let n = resid.len();
    let mut s = resid.iter().map(|e| e * e).sum::<f64>();
    for i in 1..=lags {
        let weight = 1.0 - i as f64 / (lags as f64 + 1.0);
        s += 2.0 * weight * autocovariance_sum(resid, i);
    }
    s / n as f64
}

/// Interpolate the p-value in the critical table
fn interpolate_p_value(stat: f64) -> f64 {
    let (first, last) = (CRITICAL_VALUES[0], CRITICAL_VALUES[CRITICAL_VALUES.len() - 1]);
    if stat <= first.0 {
        return first.1;
    }
    if stat >= last.0 {
        return last.1;
    }
    for pair in CRITICAL_VALUES.windows(2) {
        let ((c0, p0, _), (c1, p1, _)) = (pair[0], pair[1]);
        if stat <= c1 {
            return p0 + (stat - c0) * (p1 - p0) / (c1 - c0);
        }
    }
    last.1
}

fn sample_variance(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return 0.0;
    }
    let mean = x.iter().sum::<f64>() / n as f64;
    x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Compute the KPSS statistic on `values` (missing values are dropped)
pub fn kpss(values: &[f64]) -> Result<KpssStatistic> {
    let x = present(values);
    let n = x.len();
    if n < 2 {
        return Err(ModelError::InsufficientData {
            n_samples: n,
            n_predictors: 1,
        });
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let resid: Vec<f64> = x.iter().map(|v| v - mean).collect();

    let lags = auto_lag(&resid);

    let mut partial = 0.0;
    let eta = resid
        .iter()
        .map(|e| {
            partial += e;
            partial * partial
        })
        .sum::<f64>()
        / (n * n) as f64;

    let sigma2 = long_run_variance(&resid, lags);
    if sigma2.is_nan() || sigma2 <= 0.0 {
        return Err(ModelError::numerical("kpss", "non-positive long-run variance"));
    }

    let statistic = eta / sigma2;
    if !statistic.is_finite() {
        return Err(ModelError::numerical("kpss", "non-finite test statistic"));
    }

    let p_value = interpolate_p_value(statistic);
    if p_value == 0.01 || p_value == 0.10 {
        debug!("KPSS statistic {:.4} is outside the tabulated range, p-value clamped", statistic);
    }

    Ok(KpssStatistic {
        statistic,
        p_value,
        lags,
        nobs: n,
        critical_values: CRITICAL_VALUES
            .iter()
            .map(|(c, _, label)| (label.to_string(), *c))
            .collect(),
    })
}

/// KPSS verdict at level `alpha`.
///
/// A constant series is stationary with p = 1 and no statistic; a failed
/// computation counts as non-stationary with p = 0.
pub fn kpss_test(values: &[f64], alpha: f64) -> StationarityVerdict {
    let x = present(values);
    if x.len() >= 2 && sample_variance(&x) < ZERO_VARIANCE_TOLERANCE {
        info!("Series has zero variance, treating it as stationary without a KPSS statistic");
        return StationarityVerdict::fallback(
            TestKind::Kpss,
            true,
            1.0,
            x.len(),
            "zero variance",
        );
    }

    match kpss(&x) {
        Ok(stat) => StationarityVerdict {
            test: TestKind::Kpss,
            is_stationary: stat.p_value >= alpha,
            p_value: stat.p_value,
            statistic: Some(stat.statistic),
            lags: Some(stat.lags),
            nobs: stat.nobs,
            critical_values: stat.critical_values,
            note: None,
        },
        Err(e) => {
            warn!("KPSS test failed: {}", e);
            StationarityVerdict::fallback(TestKind::Kpss, false, 0.0, x.len(), e.to_string())
        }
    }
}
