//! ChronOxide command-line pipeline: configuration, logging setup and the
//! end-to-end analysis run.

pub mod config;
pub mod logging;
pub mod pipeline;

pub use config::Config;
pub use logging::init_logging;
pub use pipeline::{run, RunReport};
