//! Least squares building blocks
//!
//! Single-equation OLS with the inference the tests need, plus the helpers
//! that turn a multivariate sample into lagged regression designs.

pub(crate) mod linalg;
pub mod ols;


pub use ols::{ols, OlsResult};
pub(crate) use ols::f_survival;

use crate::base::Matrix;

/// Target rows `t` in `start..nrows` whose rows `t - lags ..= t` are all
/// present in `columns`.
///
/// Rows touching a missing value cannot enter a lagged regression; the
/// count of rows skipped for that reason is returned alongside.
pub(crate) fn complete_lagged_rows(
    data: &Matrix,
    columns: &[usize],
    lags: usize,
    start: usize,
) -> (Vec<usize>, usize) {
    let row_complete: Vec<bool> = data
        .rows()
        .into_iter()
        .map(|row| columns.iter().all(|&c| !row[c].is_nan()))
        .collect();

    let mut kept = Vec::new();
    let mut skipped = 0;
    for t in start.max(lags)..data.nrows() {
        if row_complete[t - lags..=t].iter().all(|&ok| ok) {
            kept.push(t);
        } else {
            skipped += 1;
        }
    }
    (kept, skipped)
}
