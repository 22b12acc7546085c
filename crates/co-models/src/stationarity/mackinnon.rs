//! MacKinnon response surfaces for the constant-only Dickey-Fuller test
//!
//! Approximate p-values follow MacKinnon (1994), finite-sample critical
//! values follow MacKinnon (2010), both for a single series.

use indexmap::IndexMap;
use statrs::distribution::{ContinuousCDF, Normal};

/// Above this statistic the p-value is 1
const TAU_MAX: f64 = 2.74;
/// Below this statistic the p-value is 0
const TAU_MIN: f64 = -18.83;
/// Switch point between the small-p and large-p polynomials
const TAU_STAR: f64 = -1.61;

const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// `(label, [b0, b1, b2, b3])`, critical value `b0 + b1/n + b2/n^2 + b3/n^3`
const TAU_2010: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.04]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Lowest power first
fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate p-value of an ADF statistic
pub(crate) fn mackinnon_p(tau: f64) -> f64 {
    if tau > TAU_MAX {
        return 1.0;
    }
    if tau < TAU_MIN {
        return 0.0;
    }

    let coefs: &[f64] = if tau <= TAU_STAR { &TAU_SMALL_P } else { &TAU_LARGE_P };
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(polyval(coefs, tau)),
        Err(_) => f64::NAN,
    }
}

/// Critical values for a regression on `nobs` observations
pub(crate) fn mackinnon_crit(nobs: usize) -> IndexMap<String, f64> {
    let inv = 1.0 / nobs as f64;
    TAU_2010
        .iter()
        .map(|(label, b)| (label.to_string(), polyval(b, inv)))
        .collect()
}
