//! Joining monthly frames and auditing the result


use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::{
    check_strictly_increasing, DataError, DataFrame, DataFrameBuilder, IndexKind, Month, Result,
    Series,
};

/// Which months survive a join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Months present in both frames
    #[default]
    Inner,
    /// Months present in either frame
    Outer,
    /// Every month of the left frame
    Left,
    /// Every month of the right frame
    Right,
}

/// A merged frame plus the column names both inputs shared
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub frame: DataFrame,
    /// Shared names; the output holds them as `<name>_x` and `<name>_y`
    pub collisions: Vec<String>,
}

/// Join two monthly frames on their month index.
///
/// Output months are sorted ascending. Cells with no source row are `NaN`.
/// Fails with [`DataError::DuplicateColumn`] when a suffixed name such as
/// `value_x` already names another column of either input.
pub fn merge(left: &DataFrame, right: &DataFrame, how: JoinKind) -> Result<MergeOutcome> {
    info!("Merging frames using {:?} join", how);

    let left_months = left.require_months()?;
    let right_months = right.require_months()?;
    check_strictly_increasing(left_months)?;
    check_strictly_increasing(right_months)?;

    let months: Vec<Month> = match how {
        JoinKind::Inner => {
            let right_set: BTreeSet<_> = right_months.iter().collect();
            left_months
                .iter()
                .filter(|m| right_set.contains(m))
                .copied()
                .collect()
        }
        JoinKind::Outer => left_months
            .iter()
            .chain(right_months)
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        JoinKind::Left => left_months.to_vec(),
        JoinKind::Right => right_months.to_vec(),
    };

    let collisions: Vec<String> = left
        .column_names()
        .into_iter()
        .filter(|name| right.has_column(name))
        .map(str::to_string)
        .collect();
    if !collisions.is_empty() {
        warn!(
            "Merged inputs share columns {:?}, suffixing them with _x and _y",
            collisions
        );
    }

    let left_rows = positions(&months, left_months);
    let right_rows = positions(&months, right_months);

    let mut builder = DataFrameBuilder::new().with_months(months);
    for (side, rows, suffix) in [(left, &left_rows, "_x"), (right, &right_rows, "_y")] {
        for (name, series) in side.iter_columns() {
            let name = if collisions.iter().any(|c| c == name) {
                format!("{}{}", name, suffix)
            } else {
                name.to_string()
            };
            builder = builder.with_column(name, gather(series, rows)?)?;
        }
    }

    let frame = builder.build()?;
    info!("Merged frame has shape {:?}", frame.shape());
    Ok(MergeOutcome { frame, collisions })
}

/// Row of each target month in a sorted month axis
fn positions(targets: &[Month], source: &[Month]) -> Vec<Option<usize>> {
    targets
        .iter()
        .map(|m| source.binary_search(m).ok())
        .collect()
}

fn gather(series: &Series, rows: &[Option<usize>]) -> Result<Series> {
    if series.is_numeric() {
        return series.take_or_missing(rows);
    }
    match rows.iter().copied().collect::<Option<Vec<_>>>() {
        Some(rows) => series.take(&rows),
        None => Err(DataError::NonNumericData(series.dtype())),
    }
}

/// Missing cells and missing months of a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub rows: usize,
    /// Missing cells per column, in column order
    pub missing_values: IndexMap<String, usize>,
    /// Length of the contiguous range from the first to the last month;
    /// `None` when the frame is not monthly
    pub expected_months: Option<usize>,
    /// Months inside that range with no row
    pub missing_months: Vec<Month>,
}

impl CompletenessReport {
    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }

    pub fn has_gaps(&self) -> bool {
        !self.missing_months.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.total_missing() == 0 && !self.has_gaps()
    }
}

/// Count missing cells and list the months absent from the index
pub fn check_completeness(frame: &DataFrame) -> CompletenessReport {
    info!("Checking data completeness");

    let missing_values = frame.missing_counts();
    let total: usize = missing_values.values().sum();
    if total > 0 {
        for (name, count) in missing_values.iter().filter(|(_, c)| **c > 0) {
            warn!("Column '{}' has {} missing values", name, count);
        }
    } else {
        info!("No missing values found");
    }

    let (expected_months, missing_months) = match frame.months() {
        Some(months) => {
            let observed: BTreeSet<Month> = months.iter().copied().collect();
            match (observed.first(), observed.last()) {
                (Some(&first), Some(&last)) => {
                    let expected = Month::range_inclusive(first, last);
                    let missing: Vec<Month> = expected
                        .iter()
                        .filter(|m| !observed.contains(m))
                        .copied()
                        .collect();
                    if missing.is_empty() {
                        info!("Monthly index is continuous");
                    } else {
                        warn!(
                            "Time series gaps detected: expected {} months, found {}; missing {:?}",
                            expected.len(),
                            observed.len(),
                            missing.iter().map(Month::to_string).collect::<Vec<_>>()
                        );
                    }
                    (Some(expected.len()), missing)
                }
                _ => (Some(0), Vec::new()),
            }
        }
        None => {
            info!("Index is not monthly, skipping gap check");
            (None, Vec::new())
        }
    };

    CompletenessReport {
        rows: frame.nrows(),
        missing_values,
        expected_months,
        missing_months,
    }
}

/// Pre-merge compatibility findings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub left_index: IndexKind,
    pub right_index: IndexKind,
    pub shared_columns: Vec<String>,
    /// Months both frames cover, when both are monthly
    pub overlapping_months: Option<usize>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.left_index == IndexKind::Monthly
            && self.right_index == IndexKind::Monthly
            && self.shared_columns.is_empty()
            && self.overlapping_months.is_some_and(|n| n > 0)
    }
}

/// Report problems a merge of `left` and `right` would run into
pub fn check_consistency(left: &DataFrame, right: &DataFrame) -> ConsistencyReport {
    let left_index = left.index().kind();
    let right_index = right.index().kind();
    if left_index != IndexKind::Monthly || right_index != IndexKind::Monthly {
        warn!(
            "Frames are not both monthly ({} vs {}), a merge will be rejected",
            left_index, right_index
        );
    }

    let shared_columns: Vec<String> = left
        .column_names()
        .into_iter()
        .filter(|name| right.has_column(name))
        .map(str::to_string)
        .collect();
    if !shared_columns.is_empty() {
        warn!("Frames share column names {:?}", shared_columns);
    }

    let overlapping_months = match (left.months(), right.months()) {
        (Some(l), Some(r)) => {
            let r: BTreeSet<&Month> = r.iter().collect();
            let overlap = l.iter().filter(|m| r.contains(m)).count();
            if overlap == 0 {
                warn!("Frames cover no common month");
            }
            Some(overlap)
        }
        _ => None,
    };

    ConsistencyReport {
        left_index,
        right_index,
        shared_columns,
        overlapping_months,
    }
}
