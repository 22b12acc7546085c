//! Tests for data module

use super::*;

use chrono::NaiveDate;

fn ym(year: i32, month: u32) -> Month {
    Month::new(year, month).unwrap()
}

#[test]
fn test_month_ordering_and_arithmetic() {
    let dec = ym(2021, 12);
    let jan = dec.succ();
    assert_eq!(jan, ym(2022, 1));
    assert_eq!(jan.pred(), dec);
    assert!(dec < jan);
    assert_eq!(dec.months_until(ym(2022, 3)), 3);
    assert_eq!(Month::from_ordinal(jan.ordinal()), jan);
    assert!(Month::new(2022, 13).is_err());
    assert!(Month::new(2022, 0).is_err());
}

#[test]
fn test_month_formats() {
    let m = ym(2013, 2);
    assert_eq!(m.to_string(), "2013-02");
    assert_eq!(m.to_dotted(), "02.2013");
    assert_eq!(m.name(), "February");
    assert_eq!("2013-02".parse::<Month>().unwrap(), m);
    assert_eq!(Month::parse_dotted("02.2013").unwrap(), m);
    assert_eq!(Month::parse_dotted("2.2013").unwrap(), m);
    assert!(Month::parse_dotted("13.2013").is_err());
    assert!(Month::parse_dotted("feb 2013").is_err());
}

#[test]
fn test_month_day_bounds() {
    let feb = ym(2024, 2);
    assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(
        Month::from_date(NaiveDate::from_ymd_opt(2024, 2, 17).unwrap()),
        feb
    );
}

#[test]
fn test_month_range_inclusive() {
    let range = Month::range_inclusive(ym(2021, 11), ym(2022, 2));
    assert_eq!(
        range,
        vec![ym(2021, 11), ym(2021, 12), ym(2022, 1), ym(2022, 2)]
    );
    assert!(Month::range_inclusive(ym(2022, 2), ym(2021, 11)).is_empty());
}

#[test]
fn test_series_creation() {
    let float_series = Series::float(vec![1.0, 2.0, 3.0]);
    assert_eq!(float_series.len(), 3);
    assert_eq!(float_series.dtype(), "float64");

    let int_series = Series::int(vec![1i64, 2, 3]);
    assert_eq!(int_series.dtype(), "int64");
    assert!(int_series.is_numeric());

    let string_series = Series::string(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(string_series.len(), 2);
    assert!(!string_series.is_numeric());

    let date_series = Series::date(vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()]);
    assert_eq!(date_series.dtype(), "date");
    assert!(date_series.as_dates().is_some());
}

#[test]
fn test_series_statistics_skip_missing() {
    let series = Series::float(vec![1.0, f64::NAN, 2.0, 3.0, 4.0, 5.0]);

    let stats = series.describe().unwrap();
    assert_eq!(stats.count, 5);
    assert_eq!(stats.missing, 1);
    assert_eq!(stats.mean, 3.0);
    assert!((stats.std - 1.58113883).abs() < 1e-6);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.q50, 3.0);
    assert_eq!(stats.max, 5.0);
    assert_eq!(series.missing_count(), 1);
}

#[test]
fn test_series_take_or_missing() {
    let series = Series::float(vec![10.0, 20.0, 30.0]);
    let taken = series.take_or_missing(&[Some(2), None, Some(0)]).unwrap();
    let values = taken.as_float().unwrap();
    assert_eq!(values[0], 30.0);
    assert!(values[1].is_nan());
    assert_eq!(values[2], 10.0);

    let strings = Series::string(vec!["x".to_string()]);
    assert_eq!(
        strings.take_or_missing(&[Some(0)]),
        Err(DataError::NonNumericData("string"))
    );
}

#[test]
fn test_dataframe_creation() {
    let df = DataFrame::from_columns(vec![
        ("x", Series::float(vec![1.0, 2.0, 3.0])),
        ("y", Series::int(vec![4i64, 5, 6])),
    ])
    .unwrap();

    assert_eq!(df.shape(), (3, 2));
    assert_eq!(df.column_names(), vec!["x", "y"]);
    assert_eq!(df.index().kind(), IndexKind::Range);
}

#[test]
fn test_dataframe_duplicate_and_mismatch() {
    let dup = DataFrame::from_columns(vec![
        ("x", Series::float(vec![1.0])),
        ("x", Series::float(vec![2.0])),
    ]);
    assert_eq!(dup, Err(DataError::DuplicateColumn("x".to_string())));

    let mismatch = DataFrameBuilder::new()
        .with_months(vec![ym(2020, 1)])
        .with_column("x", Series::float(vec![1.0, 2.0]))
        .unwrap()
        .build();
    assert!(matches!(mismatch, Err(DataError::DimensionMismatch { .. })));
}

#[test]
fn test_dataframe_select_and_filter() {
    let months = Month::range_inclusive(ym(2020, 1), ym(2020, 5));
    let df = DataFrame::monthly(
        months,
        vec![
            ("a", FloatArray::from(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
            ("b", FloatArray::from(vec![6.0, 7.0, 8.0, 9.0, 10.0])),
        ],
    )
    .unwrap();

    let selected = df.select(["b"]).unwrap();
    assert_eq!(selected.column_names(), vec!["b"]);
    assert_eq!(selected.months(), df.months());

    let filtered = df.filter(&[true, false, true, false, true]).unwrap();
    assert_eq!(filtered.nrows(), 3);
    assert_eq!(
        filtered.months().unwrap(),
        &[ym(2020, 1), ym(2020, 3), ym(2020, 5)]
    );
    assert_eq!(filtered.float_column("a").unwrap().to_vec(), vec![1.0, 3.0, 5.0]);
    assert_eq!(
        df.select(["missing"]),
        Err(DataError::ColumnNotFound("missing".to_string()))
    );
}

#[test]
fn test_dataframe_rename_keeps_position() {
    let df = DataFrame::from_columns(vec![
        ("a", Series::float(vec![1.0])),
        ("b", Series::float(vec![2.0])),
        ("c", Series::float(vec![3.0])),
    ])
    .unwrap();

    let renamed = df.rename(&[("b", "beta")]).unwrap();
    assert_eq!(renamed.column_names(), vec!["a", "beta", "c"]);

    let clash = renamed.clone().rename(&[("a", "c")]);
    assert_eq!(clash, Err(DataError::DuplicateColumn("c".to_string())));
}

#[test]
fn test_dataframe_numeric_matrix() {
    let df = DataFrame::from_columns(vec![
        ("a", Series::float(vec![1.0, 2.0, 3.0])),
        ("label", Series::string(vec!["x".into(), "y".into(), "z".into()])),
        ("b", Series::int(vec![4i64, 5, 6])),
    ])
    .unwrap();

    let matrix = df.numeric_matrix().unwrap();
    assert_eq!(matrix.shape(), &[3, 2]);
    assert_eq!(matrix[[0, 0]], 1.0);
    assert_eq!(matrix[[2, 1]], 6.0);
    assert_eq!(df.numeric_column_names(), vec!["a", "b"]);
}

#[test]
fn test_dataframe_missing_counts() {
    let df = DataFrame::from_columns(vec![
        ("a", Series::float(vec![1.0, f64::NAN, f64::NAN])),
        ("b", Series::float(vec![1.0, 2.0, 3.0])),
    ])
    .unwrap();

    let counts = df.missing_counts();
    assert_eq!(counts["a"], 2);
    assert_eq!(counts["b"], 0);
    assert!(df.has_missing());
}

#[test]
fn test_timeseries_validation() {
    let ok = TimeSeries::new("t", vec![ym(2020, 1), ym(2020, 3)], vec![1.0, 2.0]).unwrap();
    assert_eq!(ok.get(ym(2020, 3)), Some(2.0));
    assert_eq!(ok.get(ym(2020, 2)), None);

    let dup = TimeSeries::new("t", vec![ym(2020, 1), ym(2020, 1)], vec![1.0, 2.0]);
    assert_eq!(dup, Err(DataError::DuplicateMonth(ym(2020, 1))));

    let unsorted = TimeSeries::new("t", vec![ym(2020, 2), ym(2020, 1)], vec![1.0, 2.0]);
    assert!(matches!(unsorted, Err(DataError::UnsortedMonths { .. })));
}

#[test]
fn test_timeseries_frame_roundtrip() {
    let series = TimeSeries::contiguous("temp", ym(2019, 11), vec![1.0, 2.0, 3.0]);
    assert_eq!(series.last_month(), Some(ym(2020, 1)));

    let frame = series.to_frame().unwrap();
    assert_eq!(frame.column_names(), vec!["temp"]);
    assert_eq!(TimeSeries::from_frame(&frame, "temp").unwrap(), series);

    let positional = DataFrame::from_columns(vec![("temp", Series::float(vec![1.0]))]).unwrap();
    assert_eq!(
        TimeSeries::from_frame(&positional, "temp"),
        Err(DataError::NotMonthlyIndex(IndexKind::Range))
    );
}

#[test]
fn test_cell_and_label_access() {
    let df = DataFrame::monthly(
        vec![ym(2020, 1), ym(2020, 2)],
        [("v", FloatArray::from(vec![1.5, f64::NAN]))],
    )
    .unwrap();

    let series = df.get_column("v").unwrap();
    assert_eq!(series.get(0), Some(SeriesValue::Float(1.5)));
    assert_eq!(series.get(1).unwrap().to_string(), "NaN");
    assert_eq!(series.get(2), None);

    assert_eq!(df.index().get(1), Some(IndexValue::Month(ym(2020, 2))));
    assert_eq!(df.index().get(1).unwrap().to_string(), "2020-02");
    assert_eq!(Index::Range(RangeIndex::from_len(3)).get(2), Some(IndexValue::Integer(2)));
    assert_eq!(Index::Range(RangeIndex::from_len(3)).get(3), None);
}
