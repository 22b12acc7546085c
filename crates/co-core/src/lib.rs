//! ChronOxide core: month-indexed data structures, CSV loaders, cleaning and
//! merging of monthly series.

pub mod clean;
pub mod data;
pub mod error;
pub mod io;
pub mod merge;

pub use data::{DataError, DataFrame, Month, Series, TimeSeries};
pub use error::CoreError;
pub use io::{LoadError, SourceKind};
