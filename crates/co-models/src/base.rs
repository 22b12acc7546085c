//! Core types shared by the models
//!
//! Coefficient tables, fit statistics and summaries that the VAR and the
//! auxiliary regressions report through.

pub use coefficient::{Coefficient, INTERCEPT};
pub use statistics::ModelStatistics;
pub use statistics::ResidualStatistics;
pub use summary::ModelSummary;
pub use summary::ModelType;

pub use crate::error::ModelError;

pub mod coefficient;
pub mod statistics;
pub mod summary;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Matrix type alias for 2D arrays
pub type Matrix = ndarray::Array2<f64>;

/// Vector type alias for 1D arrays
pub type Vector = ndarray::Array1<f64>;
