//! End-to-end analysis run
//!
//! Load -> clean -> merge -> stationarity -> lag selection -> VAR ->
//! Granger -> validation. Each stage logs its duration; the collected results
//! form a [`RunReport`].

use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use co_core::clean::{normalize, Aggregation, Normalization};
use co_core::io::load_monthly;
use co_core::merge::{check_completeness, check_consistency, merge, CompletenessReport};
use co_core::{DataFrame, Month, SourceKind};
use co_models::stationarity::DifferencingOutcome;
use co_models::validation::{BootstrapResult, RollingOriginReport};
use co_models::var::lag_order::max_estimable_lag;
use co_models::var::VarSummary;
use co_models::{
    bootstrap_granger, difference_until_stationary, rolling_origin, select_order, summarize,
    FittedVar, GrangerOutcome, GrangerSummary, GrangerTester, LagSelection, Var,
};

use crate::config::{Config, PlotConfig};

/// First and last analysed month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start: String,
    pub end: String,
    pub months: usize,
}

/// Out-of-sample checks of the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub rolling_origin: Option<RollingOriginReport>,
    pub bootstrap: Vec<BootstrapResult>,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub variables: Vec<String>,
    pub period: Period,
    /// Column names both sources shared before the merge
    pub collisions: Vec<String>,
    pub completeness: CompletenessReport,
    pub differencing: DifferencingOutcome,
    pub lag_selection: LagSelection,
    pub var: VarSummary,
    pub granger: Vec<GrangerOutcome>,
    pub granger_summary: GrangerSummary,
    pub validation: Option<ValidationReport>,
    pub plot: PlotConfig,
}

/// Run every stage with `config`
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let data = &config.data;
    let prep = &config.preprocessing;

    let temperature = timed("Temperature preparation", || {
        prepare(
            &data.temperature_path,
            SourceKind::Temperature,
            &data.temperature_column,
            prep.temperature_aggregation,
            prep.temperature_normalization,
        )
    })
    .with_context(|| {
        format!(
            "failed to prepare temperature data from {}",
            data.temperature_path.display()
        )
    })?;

    let secondary = timed("Secondary preparation", || {
        prepare(
            &data.secondary_path,
            data.secondary_dataset,
            data.secondary_column(),
            prep.secondary_aggregation,
            prep.secondary_normalization,
        )
    })
    .with_context(|| {
        format!(
            "failed to prepare {} data from {}",
            data.secondary_dataset,
            data.secondary_path.display()
        )
    })?;

    check_consistency(&temperature, &secondary);
    let merged = merge(&temperature, &secondary, prep.join).context("failed to merge series")?;
    let frame = merged.frame;
    if frame.nrows() == 0 {
        bail!("the two sources share no months");
    }

    let completeness = check_completeness(&frame);
    let months = frame.require_months()?;
    let period = Period {
        start: format_month(months[0], &data.date_format)?,
        end: format_month(months[months.len() - 1], &data.date_format)?,
        months: months.len(),
    };
    info!(
        "Analysing {} months from {} to {}",
        period.months, period.start, period.end
    );

    let differencing = timed("Stationarity", || {
        Ok(difference_until_stationary(&frame, &config.stationarity)?)
    })?;
    if !differencing.stationary {
        warn!(
            "Proceeding with series that are not stationary after {} differences",
            differencing.order
        );
    }
    let analysed = &differencing.frame;

    let lag_selection = timed("Lag selection", || select_lag(analysed, config))?;
    let lag = lag_selection
        .preferred()
        .ok_or_else(|| anyhow!("no lag order could be selected"))?;
    info!("Selected lag order {}", lag);

    let model = timed("VAR estimation", || {
        Ok(Var::new(lag).data(analysed).fit()?.into_results()?)
    })?;
    let var = model.summary()?;

    let granger_lag = config.granger.max_lag.unwrap_or(lag);
    let granger = timed("Granger causality", || {
        Ok(GrangerTester::new(granger_lag, config.granger.alpha).test_model(&model)?)
    })?;
    let granger_summary = summarize(&granger);

    let validation = if config.validation.enabled {
        Some(timed("Validation", || Ok(validate(analysed, &model, &granger, config)))?)
    } else {
        None
    };

    Ok(RunReport {
        variables: model.names().to_vec(),
        period,
        collisions: merged.collisions,
        completeness,
        differencing,
        lag_selection,
        var,
        granger,
        granger_summary,
        validation,
        plot: config.plot.clone(),
    })
}

/// Monthly, normalized single-column frame of `column`
fn prepare(
    path: &Path,
    kind: SourceKind,
    column: &str,
    aggregation: Aggregation,
    normalization: Normalization,
) -> Result<DataFrame> {
    let monthly = load_monthly(path, kind, column, aggregation)?;
    Ok(normalize(&monthly, normalization).to_frame()?)
}

/// Scan lag orders up to the configured maximum, clipped to the sample
fn select_lag(frame: &DataFrame, config: &Config) -> Result<LagSelection> {
    let neqs = frame.numeric_column_names().len();
    let limit = max_estimable_lag(frame.nrows(), neqs);
    if limit == 0 {
        bail!(
            "{} months of {} series are too few to fit any VAR",
            frame.nrows(),
            neqs
        );
    }

    let max_lag = config.var.max_lag.min(limit);
    if max_lag < config.var.max_lag {
        warn!(
            "Maximum lag {} exceeds what {} months support, scanning up to {}",
            config.var.max_lag,
            frame.nrows(),
            max_lag
        );
    }
    Ok(select_order(frame, max_lag, &config.var.criteria)?)
}

/// Rolling-origin evaluation plus a bootstrap of every tested pair.
///
/// Failures are logged and leave the corresponding entry out.
fn validate(
    frame: &DataFrame,
    model: &FittedVar,
    granger: &[GrangerOutcome],
    config: &Config,
) -> ValidationReport {
    let v = &config.validation;

    let rolling_origin = match rolling_origin(
        frame,
        model.lag_order(),
        v.cross_validation_window,
        v.cross_validation_steps,
    ) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Rolling-origin evaluation skipped: {}", e);
            None
        }
    };

    let bootstrap = granger
        .iter()
        .filter_map(GrangerOutcome::result)
        .filter_map(|r| {
            match bootstrap_granger(
                frame,
                &r.caused,
                &r.causing,
                r.lag,
                v.bootstrap_iterations,
                v.seed,
            ) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Bootstrap of {} -> {} skipped: {}", r.causing, r.caused, e);
                    None
                }
            }
        })
        .collect();

    ValidationReport {
        rolling_origin,
        bootstrap,
    }
}

fn format_month(month: Month, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", month.first_day().format(format))
        .map_err(|_| anyhow!("invalid date format '{}'", format))?;
    Ok(out)
}

fn timed<T>(stage: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    info!("{} took {:.4} seconds", stage, start.elapsed().as_secs_f64());
    result
}
