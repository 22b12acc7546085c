//! Lag order selection
//!
//! Every candidate order is fitted on the same rows: the first `max_lags`
//! observations are held back for all of them, so the criteria compare fits
//! of equal sample size.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use co_core::data::DataFrame;

use super::{estimate, InfoCriteria, VarSample};
use crate::base::{ModelError, Result};
use crate::lm::complete_lagged_rows;

/// Penalized fit criterion used to rank lag orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    Aic,
    Bic,
    Hqic,
    Fpe,
}

impl InformationCriterion {
    pub const ALL: [InformationCriterion; 4] = [
        InformationCriterion::Aic,
        InformationCriterion::Bic,
        InformationCriterion::Hqic,
        InformationCriterion::Fpe,
    ];

    pub fn value(self, info: &InfoCriteria) -> f64 {
        match self {
            InformationCriterion::Aic => info.aic,
            InformationCriterion::Bic => info.bic,
            InformationCriterion::Hqic => info.hqic,
            InformationCriterion::Fpe => info.fpe,
        }
    }
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InformationCriterion::Aic => "aic",
            InformationCriterion::Bic => "bic",
            InformationCriterion::Hqic => "hqic",
            InformationCriterion::Fpe => "fpe",
        };
        f.write_str(name)
    }
}

impl FromStr for InformationCriterion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aic" => Ok(InformationCriterion::Aic),
            "bic" => Ok(InformationCriterion::Bic),
            "hqic" => Ok(InformationCriterion::Hqic),
            "fpe" => Ok(InformationCriterion::Fpe),
            other => Err(ModelError::InvalidConfig {
                message: format!("unknown information criterion '{}'", other),
            }),
        }
    }
}

/// Criteria of one candidate order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagScore {
    pub lag: usize,
    #[serde(flatten)]
    pub criteria: InfoCriteria,
}

/// Outcome of a lag scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagSelection {
    pub max_lags: usize,
    /// Observations every candidate was fitted on
    pub nobs: usize,
    /// Candidates that could be estimated, in increasing order
    pub scores: Vec<LagScore>,
    /// Minimizing order per requested criterion
    pub selected: IndexMap<InformationCriterion, usize>,
}

impl LagSelection {
    pub fn best(&self, criterion: InformationCriterion) -> Option<usize> {
        self.selected.get(&criterion).copied()
    }

    /// Order chosen by the first requested criterion
    pub fn preferred(&self) -> Option<usize> {
        self.selected.values().next().copied()
    }
}

/// Largest order `max_lags` may take for `nobs` rows of `neqs` variables
pub fn max_estimable_lag(nobs: usize, neqs: usize) -> usize {
    nobs.saturating_sub(neqs + 1) / (1 + neqs)
}

/// Score orders `1..=max_lags` on the numeric columns of `frame`.
///
/// An empty `criteria` list selects by every criterion.
pub fn select_order(
    frame: &DataFrame,
    max_lags: usize,
    criteria: &[InformationCriterion],
) -> Result<LagSelection> {
    if max_lags == 0 {
        return Err(ModelError::InvalidMaxLag(max_lags));
    }

    let sample = VarSample::from_frame(frame)?;
    let neqs = sample.neqs();
    let limit = max_estimable_lag(sample.nrows(), neqs);
    if max_lags > limit {
        return Err(ModelError::InsufficientData {
            n_samples: sample.nrows(),
            n_predictors: neqs * max_lags + 1,
        });
    }

    let columns: Vec<usize> = (0..neqs).collect();
    let (rows, skipped) = complete_lagged_rows(&sample.values, &columns, max_lags, max_lags);
    if skipped > 0 {
        warn!("{} rows excluded from the lag scan because of missing values", skipped);
    }
    info!(
        "Selecting lag order up to {} on {} observations of {} variables",
        max_lags,
        rows.len(),
        neqs
    );

    let mut scores = Vec::with_capacity(max_lags);
    for lag in 1..=max_lags {
        match estimate(&sample.values, &rows, lag) {
            Ok(fit) => {
                debug!(
                    "lag {}: aic={:.4} bic={:.4} hqic={:.4} fpe={:.4e}",
                    lag, fit.info.aic, fit.info.bic, fit.info.hqic, fit.info.fpe
                );
                scores.push(LagScore {
                    lag,
                    criteria: fit.info,
                });
            }
            Err(e) => warn!("Lag {} could not be estimated: {}", lag, e),
        }
    }
    if scores.is_empty() {
        return Err(ModelError::numerical(
            "select_order",
            "no candidate lag order could be estimated",
        ));
    }

    let requested: &[InformationCriterion] = if criteria.is_empty() {
        &InformationCriterion::ALL
    } else {
        criteria
    };

    let mut selected = IndexMap::new();
    for &criterion in requested {
        let best = scores
            .iter()
            .filter(|s| criterion.value(&s.criteria).is_finite())
            .min_by(|a, b| criterion.value(&a.criteria).total_cmp(&criterion.value(&b.criteria)))
            .map(|s| s.lag);
        if let Some(lag) = best {
            info!("{} selects lag order {}", criterion, lag);
            selected.insert(criterion, lag);
        }
    }

    Ok(LagSelection {
        max_lags,
        nobs: rows.len(),
        scores,
        selected,
    })
}
