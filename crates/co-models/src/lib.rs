//! ChronOxide models: stationarity tests, VAR estimation, Granger causality
//! and forecast validation on monthly data.

pub mod base;
pub mod error;
pub mod granger;
pub mod lm;
pub mod stationarity;
pub mod validation;
pub mod var;

pub use error::ModelError;
pub use granger::{summarize, GrangerOutcome, GrangerResult, GrangerSummary, GrangerTester};
pub use stationarity::{
    apply_differencing, check_frame, check_stationarity, difference_until_stationary,
    StationarityConfig, StationarityVerdict,
};
pub use validation::{bootstrap_granger, rolling_origin};
pub use var::{fit_var, select_order, FittedVar, InformationCriterion, LagSelection, Var};
