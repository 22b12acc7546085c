//! Model-related error types

use thiserror::Error;

use co_core::data::DataError;

/// Model-related errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Data-related error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Numerical computation error
    #[error("Numerical error: {message} (operation: {operation})")]
    NumericalError {
        /// Error message
        message: String,
        /// Operation that failed
        operation: String,
    },

    /// Insufficient data for model fitting
    #[error("Not enough data: {n_samples} samples for {n_predictors} predictors")]
    InsufficientData {
        /// Number of usable samples
        n_samples: usize,
        /// Number of predictors
        n_predictors: usize,
    },

    /// Singular matrix encountered
    #[error("Singular matrix encountered in {0}")]
    SingularMatrix(&'static str),

    /// VAR lag order outside the estimable range
    #[error("Invalid lag order {0}: a VAR needs at least one lag")]
    InvalidLagOrder(usize),

    /// Maximum lag for lag scans or causality tests
    #[error("Invalid maximum lag {0}: must be a positive integer")]
    InvalidMaxLag(usize),

    /// A variable name that is not part of the model
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    /// Invalid model configuration
    #[error("Invalid model configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },

    /// Model not fitted yet
    #[error("Model not fitted yet")]
    NotFitted,
}

impl ModelError {
    pub(crate) fn numerical(operation: &str, message: impl Into<String>) -> Self {
        ModelError::NumericalError {
            message: message.into(),
            operation: operation.to_string(),
        }
    }
}
