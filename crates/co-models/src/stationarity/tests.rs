//! Tests for the stationarity tests and differencing

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use co_core::data::{DataFrame, FloatArray, Month, Series, TimeSeries};

use super::*;
use crate::stationarity::adf::default_max_lag;

// ==================== Test Fixtures ====================

fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut level = 0.0;
    white_noise(n, seed)
        .into_iter()
        .map(|e| {
            level += e;
            level
        })
        .collect()
}

fn start() -> Month {
    Month::new(2010, 1).unwrap()
}

// ==================== ADF ====================

#[test]
fn test_adf_rejects_unit_root_for_white_noise() {
    let verdict = adf_test(&white_noise(200, 7), DEFAULT_ALPHA);

    assert_eq!(verdict.test, TestKind::Adf);
    assert!(verdict.is_stationary);
    assert!(verdict.p_value < 0.01);
    assert!(verdict.statistic.unwrap() < verdict.critical_values["1%"]);
    assert!(verdict.note.is_none());
}

#[test]
fn test_adf_random_walk_has_larger_p_value() {
    let noise = adf(&white_noise(250, 11)).unwrap();
    let walk = adf(&random_walk(250, 11)).unwrap();
    assert!(walk.p_value > noise.p_value);
    assert!(walk.statistic > noise.statistic);
}

#[test]
fn test_adf_lag_bounds_and_sample() {
    let x = random_walk(120, 3);
    let maxlag = default_max_lag(120).unwrap();
    assert_eq!(maxlag, 13);

    let stat = adf(&x).unwrap();
    assert!(stat.used_lag <= maxlag);
    // one observation lost to differencing, `used_lag` to the lags
    assert_eq!(stat.nobs, 120 - 1 - stat.used_lag);
    assert_eq!(stat.critical_values.len(), 3);
}

#[test]
fn test_adf_drops_missing_values() {
    let mut x = white_noise(100, 5);
    let clean_stat = adf(&x).unwrap();
    x.insert(0, f64::NAN);
    x.push(f64::NAN);

    let stat = adf(&x).unwrap();
    assert_abs_diff_eq!(stat.statistic, clean_stat.statistic, epsilon = 1e-12);
}

#[test]
fn test_adf_failures_are_conservative() {
    let short = adf_test(&[1.0, 2.0, 1.5], DEFAULT_ALPHA);
    assert!(!short.is_stationary);
    assert_eq!(short.p_value, 1.0);
    assert!(short.statistic.is_none());
    assert!(short.note.is_some());

    let constant = adf_test(&[3.0; 50], DEFAULT_ALPHA);
    assert!(!constant.is_stationary);
    assert_eq!(constant.p_value, 1.0);
}

#[test]
fn test_default_max_lag() {
    assert_eq!(default_max_lag(100).unwrap(), 12);
    // capped at n/2 - 2
    assert_eq!(default_max_lag(20).unwrap(), 8);
    assert!(default_max_lag(3).is_err());
}

// ==================== KPSS ====================

#[test]
fn test_kpss_zero_variance_is_stationary() {
    let verdict = kpss_test(&[4.2; 60], DEFAULT_ALPHA);

    assert_eq!(verdict.test, TestKind::Kpss);
    assert!(verdict.is_stationary);
    assert_eq!(verdict.p_value, 1.0);
    assert!(verdict.statistic.is_none());
    assert!(verdict.lags.is_none());
}

#[test]
fn test_kpss_rejects_random_walk() {
    let verdict = kpss_test(&random_walk(300, 21), DEFAULT_ALPHA);
    assert!(!verdict.is_stationary);
    assert_abs_diff_eq!(verdict.p_value, 0.01, epsilon = 1e-12);

    let labels: Vec<&str> = verdict.critical_values.keys().map(String::as_str).collect();
    assert_eq!(labels, vec!["10%", "5%", "2.5%", "1%"]);
}

#[test]
fn test_kpss_trend_larger_than_noise() {
    let noise = kpss(&white_noise(200, 8)).unwrap();
    let trend: Vec<f64> = white_noise(200, 8)
        .iter()
        .enumerate()
        .map(|(t, e)| 0.5 * t as f64 + e)
        .collect();
    let trend = kpss(&trend).unwrap();

    assert!(trend.statistic > noise.statistic);
    assert!((0.01..=0.10).contains(&noise.p_value));
    assert!(noise.lags < 200);
}

#[test]
fn test_kpss_failure_is_conservative() {
    let verdict = kpss_test(&[1.0], DEFAULT_ALPHA);
    assert!(!verdict.is_stationary);
    assert_eq!(verdict.p_value, 0.0);
}

// ==================== Combined verdicts ====================

#[test]
fn test_check_stationarity_combines_tests() {
    let series = TimeSeries::contiguous("walk", start(), random_walk(300, 21));
    let result = check_stationarity(&series, &StationarityConfig::default());

    assert_eq!(result.name, "walk");
    assert!(!result.kpss.is_stationary);
    assert!(!result.is_stationary());
}

#[test]
fn test_check_frame_covers_numeric_columns() {
    let months = Month::range_inclusive(start(), Month::from_ordinal(start().ordinal() + 99));
    let frame = DataFrame::monthly(
        months,
        [
            ("noise", FloatArray::from(white_noise(100, 1))),
            ("walk", FloatArray::from(random_walk(100, 2))),
        ],
    )
    .unwrap()
    .with_column("label", Series::string(vec!["x".to_string(); 100]))
    .unwrap();

    let results = check_frame(&frame, &StationarityConfig::default()).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["noise", "walk"]);
}

// ==================== Differencing ====================

#[test]
fn test_differencing_series() {
    let series = TimeSeries::contiguous("sq", start(), vec![1.0, 4.0, 9.0, 16.0]);

    let same = apply_differencing(&series, 0).unwrap();
    assert_eq!(same, series);

    let once = apply_differencing(&series, 1).unwrap();
    assert_eq!(once.values().to_vec(), vec![3.0, 5.0, 7.0]);
    assert_eq!(once.first_month(), Some(Month::new(2010, 2).unwrap()));

    let twice = apply_differencing(&series, 2).unwrap();
    assert_eq!(twice.values().to_vec(), vec![2.0, 2.0]);
    assert_eq!(twice.len(), series.len() - 2);
}

#[test]
fn test_differencing_frame() {
    let frame = DataFrame::monthly(
        Month::range_inclusive(start(), Month::new(2010, 5).unwrap()),
        [
            ("a", FloatArray::from(vec![1.0, 2.0, 4.0, 7.0, 11.0])),
            ("b", FloatArray::from(vec![5.0, f64::NAN, 5.0, 5.0, 6.0])),
        ],
    )
    .unwrap();

    let once = apply_differencing(&frame, 1).unwrap();
    assert_eq!(once.nrows(), 4);
    assert_eq!(once.months().unwrap()[0], Month::new(2010, 2).unwrap());
    assert_eq!(once.float_column("a").unwrap().to_vec(), vec![1.0, 2.0, 3.0, 4.0]);

    let b = once.float_column("b").unwrap();
    assert!(b[0].is_nan() && b[1].is_nan());
    assert_eq!(b[3], 1.0);

    assert_eq!(apply_differencing(&frame, 3).unwrap().nrows(), 2);
    let same = apply_differencing(&frame, 0).unwrap();
    assert_eq!(same.shape(), frame.shape());
    assert_eq!(same.months(), frame.months());
}

#[test]
fn test_difference_until_stationary_on_random_walk() {
    let n = 300;
    let months = Month::range_inclusive(start(), Month::from_ordinal(start().ordinal() + n as i64 - 1));
    let frame = DataFrame::monthly(months, [("walk", FloatArray::from(random_walk(n, 21)))]).unwrap();

    let outcome = difference_until_stationary(&frame, &StationarityConfig::default()).unwrap();
    assert!(outcome.order >= 1);
    assert_eq!(outcome.frame.nrows(), n - outcome.order);
    assert_eq!(outcome.verdicts.len(), 1);

    let capped = StationarityConfig {
        max_diff_order: 0,
        ..StationarityConfig::default()
    };
    let outcome = difference_until_stationary(&frame, &capped).unwrap();
    assert_eq!(outcome.order, 0);
    assert!(!outcome.stationary);
    assert_eq!(outcome.frame.nrows(), n);
}
