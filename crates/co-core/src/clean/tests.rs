//! Tests for cleaning

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;

use super::*;
use crate::data::IndexKind;

fn ym(year: i32, month: u32) -> Month {
    Month::new(year, month).unwrap()
}

fn daily_frame() -> DataFrame {
    // deliberately out of order, spanning Jan and Mar 2020 with Feb empty
    let dates = vec![
        NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
        NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 1, 20).unwrap(),
    ];
    DataFrame::from_columns(vec![
        ("Date", Series::date(dates)),
        ("Value", Series::float(vec![10.0, 2.0, 1.0, 20.0, f64::NAN])),
    ])
    .unwrap()
}

#[test]
fn test_unify_timestamps_sorts_and_indexes() {
    let df = daily_frame();
    let unified = unify_timestamps(&df, "Date").unwrap();

    assert_eq!(unified.index().kind(), IndexKind::Monthly);
    assert_eq!(
        unified.months().unwrap(),
        &[ym(2020, 1), ym(2020, 1), ym(2020, 1), ym(2020, 3), ym(2020, 3)]
    );
    let values = unified.float_column("Value").unwrap();
    assert_eq!(values[0], 1.0);
    assert_eq!(values[1], 2.0);
    assert!(values[2].is_nan());
    assert_eq!(values[3], 20.0);
    assert_eq!(values[4], 10.0);

    // input untouched
    assert_eq!(df.index().kind(), IndexKind::Range);
}

#[test]
fn test_unify_timestamps_errors() {
    let df = daily_frame();
    assert_eq!(
        unify_timestamps(&df, "When"),
        Err(DataError::ColumnNotFound("When".to_string()))
    );
    assert!(matches!(
        unify_timestamps(&df, "Value"),
        Err(DataError::TypeMismatch { expected: "date", .. })
    ));
}

#[test]
fn test_aggregate_monthly_fills_gaps() {
    let unified = unify_timestamps(&daily_frame(), "Date").unwrap();

    let mean = aggregate_monthly(&unified, "Value", Aggregation::Mean).unwrap();
    assert_eq!(mean.months(), &[ym(2020, 1), ym(2020, 2), ym(2020, 3)]);
    assert_eq!(mean.values()[0], 1.5);
    assert!(mean.values()[1].is_nan());
    assert_eq!(mean.values()[2], 15.0);

    let sum = aggregate_monthly(&unified, "Value", Aggregation::Sum).unwrap();
    assert_eq!(sum.values().to_vec(), vec![3.0, 0.0, 30.0]);

    let count = aggregate_monthly(&unified, "Value", Aggregation::Count).unwrap();
    assert_eq!(count.values().to_vec(), vec![2.0, 0.0, 2.0]);
}

#[test]
fn test_aggregations() {
    let values = [3.0, 1.0, 4.0, 1.0, 5.0];
    assert_eq!(Aggregation::Median.apply(&values), 3.0);
    assert_eq!(Aggregation::Min.apply(&values), 1.0);
    assert_eq!(Aggregation::Max.apply(&values), 5.0);
    assert_eq!(Aggregation::First.apply(&values), 3.0);
    assert_eq!(Aggregation::Last.apply(&values), 5.0);
    assert!(Aggregation::Median.apply(&[]).is_nan());
}

#[test]
fn test_aggregate_requires_time_index() {
    let df = daily_frame();
    assert_eq!(
        aggregate_monthly(&df, "Value", Aggregation::Mean),
        Err(DataError::NotMonthlyIndex(IndexKind::Range))
    );

    let unified = unify_timestamps(&df, "Date").unwrap();
    assert_eq!(
        aggregate_monthly(&unified, "Nope", Aggregation::Mean),
        Err(DataError::ColumnNotFound("Nope".to_string()))
    );
}

#[test]
fn test_aggregate_frame_aligns_columns() {
    let unified = unify_timestamps(&daily_frame(), "Date").unwrap();
    let frame = aggregate_frame(
        &unified,
        &[("Value", Aggregation::Mean), ("Value", Aggregation::Sum)],
    );
    // both aggregates would be named "Value"
    assert_eq!(frame, Err(DataError::DuplicateColumn("Value".to_string())));

    let renamed = unified.rename(&[("Value", "Other")]).unwrap();
    let frame = aggregate_frame(&renamed, &[("Other", Aggregation::Max)]).unwrap();
    assert_eq!(frame.nrows(), 3);
    assert_eq!(frame.float_column("Other").unwrap()[2], 20.0);
}

#[test]
fn test_zscore_normalization() {
    let series = TimeSeries::contiguous("t", ym(2020, 1), vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    let z = normalize(&series, Normalization::ZScore);

    let n = z.len() as f64;
    let mean = z.values().sum() / n;
    let var = z.values().iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(var.sqrt(), 1.0, epsilon = 1e-12);
    // population std of the input is exactly 2
    assert_abs_diff_eq!(z.values()[0], -1.5, epsilon = 1e-12);
    assert_eq!(z.months(), series.months());
}

#[test]
fn test_zscore_zero_std_and_missing() {
    let flat = TimeSeries::contiguous("flat", ym(2020, 1), vec![3.0, 3.0, 3.0]);
    assert_eq!(normalize(&flat, Normalization::ZScore), flat);

    let gappy = TimeSeries::contiguous("g", ym(2020, 1), vec![1.0, f64::NAN, 3.0]);
    let z = normalize(&gappy, Normalization::ZScore);
    assert_abs_diff_eq!(z.values()[0], -1.0, epsilon = 1e-12);
    assert!(z.values()[1].is_nan());
    assert_abs_diff_eq!(z.values()[2], 1.0, epsilon = 1e-12);
}

#[test]
fn test_log_normalization() {
    let series = TimeSeries::contiguous("s", ym(2020, 1), vec![10.0, 20.0, 0.0, 40.0, -5.0]);
    let logged = normalize(&series, Normalization::Log);

    assert_abs_diff_eq!(logged.values()[0], 10f64.ln(), epsilon = 1e-12);
    assert_abs_diff_eq!(logged.values()[1], 20f64.ln(), epsilon = 1e-12);
    assert_eq!(logged.values()[2], 0.0);
    assert_abs_diff_eq!(logged.values()[3], 40f64.ln(), epsilon = 1e-12);
    assert_eq!(logged.values()[4], 0.0);

    assert_eq!(normalize(&series, Normalization::None), series);
}

#[test]
fn test_aggregate_daily_index_across_month_boundary() {
    let dates = vec![
        NaiveDate::from_ymd_opt(2021, 1, 30).unwrap(),
        NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
        NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2021, 2, 2).unwrap(),
        NaiveDate::from_ymd_opt(2021, 2, 3).unwrap(),
    ];
    let df = DataFrame::from_columns(vec![(
        "Value",
        Series::float(vec![1.0, 3.0, 10.0, 20.0, f64::NAN]),
    )])
    .unwrap()
    .with_index(Index::daily(dates))
    .unwrap();
    assert_eq!(df.index().kind(), IndexKind::Daily);

    let mean = aggregate_monthly(&df, "Value", Aggregation::Mean).unwrap();
    assert_eq!(mean.months(), &[ym(2021, 1), ym(2021, 2)]);
    assert_abs_diff_eq!(mean.values()[0], 2.0);
    assert_abs_diff_eq!(mean.values()[1], 15.0);

    let sum = aggregate_monthly(&df, "Value", Aggregation::Sum).unwrap();
    assert_abs_diff_eq!(sum.values()[0], 4.0);
    assert_abs_diff_eq!(sum.values()[1], 30.0);
}
