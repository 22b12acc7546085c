//! Bridges between ndarray containers and nalgebra decompositions

use nalgebra::DMatrix;

use crate::base::{Matrix, ModelError, Result};

pub(crate) fn to_dmatrix(x: &Matrix) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[[i, j]])
}

pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> Matrix {
    Matrix::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Inverse of a symmetric positive definite matrix.
///
/// Cholesky first; LU when the matrix is only numerically semi-definite.
pub(crate) fn inverse_spd(a: &Matrix, operation: &'static str) -> Result<Matrix> {
    let a = to_dmatrix(a);
    if let Some(chol) = a.clone().cholesky() {
        return Ok(from_dmatrix(&chol.inverse()));
    }
    a.try_inverse()
        .map(|inv| from_dmatrix(&inv))
        .ok_or(ModelError::SingularMatrix(operation))
}

/// `ln det(a)` of a symmetric positive definite matrix
pub(crate) fn logdet_spd(a: &Matrix, operation: &'static str) -> Result<f64> {
    let chol = to_dmatrix(a)
        .cholesky()
        .ok_or(ModelError::SingularMatrix(operation))?;
    Ok(2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>())
}
