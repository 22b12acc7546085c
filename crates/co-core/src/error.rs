use crate::data::DataError;
use crate::io::LoadError;

/// Umbrella error for everything `co-core` can fail with
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

/// Result type for cross-module `co-core` operations
pub type Result<T> = std::result::Result<T, CoreError>;
