//! Tests for VAR estimation and lag selection

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use co_core::data::{DataFrame, FloatArray, Month};

use super::*;
use crate::base::ModelError;

// ==================== Test Fixtures ====================

/// Simulate `y_t = c + A y_{t-1} + e_t` with standard normal shocks
fn simulate_var1(c: [f64; 2], a: [[f64; 2]; 2], n: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();

    let burn_in = 100;
    let mut y = Array2::zeros((n + burn_in, 2));
    for t in 1..n + burn_in {
        for i in 0..2 {
            y[[t, i]] = c[i]
                + a[i][0] * y[[t - 1, 0]]
                + a[i][1] * y[[t - 1, 1]]
                + normal.sample(&mut rng);
        }
    }
    y.slice(ndarray::s![burn_in.., ..]).to_owned()
}

fn to_frame(values: &Array2<f64>, names: [&str; 2]) -> DataFrame {
    let start = Month::new(2000, 1).unwrap();
    let months = (0..values.nrows() as i64)
        .map(|i| Month::from_ordinal(start.ordinal() + i))
        .collect();
    DataFrame::monthly(
        months,
        names
            .iter()
            .enumerate()
            .map(|(j, name)| (*name, FloatArray::from(values.column(j).to_vec()))),
    )
    .unwrap()
}

const A: [[f64; 2]; 2] = [[0.5, 0.1], [0.0, 0.4]];
const C: [f64; 2] = [1.0, -0.5];

fn var1_frame(n: usize, seed: u64) -> DataFrame {
    to_frame(&simulate_var1(C, A, n, seed), ["x", "y"])
}

// ==================== Estimation ====================

#[test]
fn test_fit_recovers_coefficients() {
    let fitted = fit_var(&var1_frame(600, 42), 1).unwrap();

    assert_eq!(fitted.names(), &["x".to_string(), "y".to_string()]);
    assert_eq!(fitted.lag_order(), 1);
    assert_eq!(fitted.nobs(), 599);
    assert_eq!(fitted.df_resid(), 599 - 3);
    assert_eq!(fitted.params().dim(), (3, 2));
    assert_eq!(fitted.residuals().dim(), (599, 2));

    let a1 = &fitted.coefs()[0];
    for i in 0..2 {
        for j in 0..2 {
            assert_abs_diff_eq!(a1[[i, j]], A[i][j], epsilon = 0.1);
        }
    }
    assert_abs_diff_eq!(fitted.intercept()[0], C[0], epsilon = 0.3);
    assert_abs_diff_eq!(fitted.intercept()[1], C[1], epsilon = 0.3);
    assert_abs_diff_eq!(fitted.sigma_u()[[0, 0]], 1.0, epsilon = 0.2);
}

#[test]
fn test_coefficient_layout_matches_params() {
    let fitted = fit_var(&var1_frame(300, 1), 2).unwrap();
    let params = fitted.params();

    // params row 1 + l*K + j, column i  <->  coefs[l][[i, j]]
    for l in 0..2 {
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(fitted.coefs()[l][[i, j]], params[[1 + l * 2 + j, i]]);
            }
        }
    }
    assert_eq!(
        fitted.term_names(),
        vec!["const", "L1.x", "L1.y", "L2.x", "L2.y"]
    );
}

#[test]
fn test_information_criteria_formulas() {
    let fitted = fit_var(&var1_frame(200, 3), 1).unwrap();
    let n = fitted.nobs() as f64;

    let resid = fitted.residuals();
    let sse = resid.t().dot(resid) / n;
    let ld = (sse[[0, 0]] * sse[[1, 1]] - sse[[0, 1]] * sse[[1, 0]]).ln();
    let free = (1 * 2 * 2 + 2) as f64;

    let info = fitted.info_criteria();
    assert_abs_diff_eq!(info.aic, ld + 2.0 * free / n, epsilon = 1e-9);
    assert_abs_diff_eq!(info.bic, ld + n.ln() * free / n, epsilon = 1e-9);
    assert_abs_diff_eq!(info.hqic, ld + 2.0 * n.ln().ln() * free / n, epsilon = 1e-9);
    let df_model = 3.0;
    assert_abs_diff_eq!(
        info.fpe,
        ((n + df_model) / (n - df_model)).powi(2) * ld.exp(),
        epsilon = 1e-9
    );
}

#[test]
fn test_stability() {
    let fitted = fit_var(&var1_frame(600, 42), 1).unwrap();
    assert!(fitted.is_stable());
    assert_eq!(fitted.eigenvalues().len(), 2);
    assert!(fitted.roots().iter().all(|r| r.norm() > 1.0));

    let explosive = to_frame(
        &simulate_var1([0.0, 0.0], [[1.05, 0.0], [0.0, 0.3]], 150, 9),
        ["boom", "calm"],
    );
    let fitted = fit_var(&explosive, 1).unwrap();
    assert!(!fitted.is_stable());
}

#[test]
fn test_companion_has_kp_eigenvalues() {
    let fitted = fit_var(&var1_frame(300, 5), 3).unwrap();
    assert_eq!(fitted.eigenvalues().len(), 6);
    for (ev, root) in fitted.eigenvalues().iter().zip(fitted.roots()) {
        assert_abs_diff_eq!(ev.norm() * root.norm(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_invalid_lag_order_and_not_fitted() {
    let frame = var1_frame(50, 1);
    assert!(matches!(
        Var::new(0).data(&frame).fit(),
        Err(ModelError::InvalidLagOrder(0))
    ));

    let model = Var::new(1).data(&frame);
    assert!(matches!(model.results(), Err(ModelError::NotFitted)));
    assert!(matches!(Var::new(1).fit(), Err(ModelError::InvalidConfig { .. })));

    let model = model.fit().unwrap();
    assert_eq!(model.results().unwrap().lag_order(), 1);
}

#[test]
fn test_fit_skips_rows_with_missing_values() {
    let mut values = simulate_var1(C, A, 120, 8);
    values[[60, 1]] = f64::NAN;
    let fitted = fit_var(&to_frame(&values, ["x", "y"]), 2).unwrap();

    // targets 60, 61 and 62 all touch row 60
    assert_eq!(fitted.nobs(), 120 - 2 - 3);
    assert!(fitted.residuals().iter().all(|v| v.is_finite()));
}

#[test]
fn test_univariate_autoregression() {
    let values = simulate_var1([0.0, 0.0], [[0.6, 0.0], [0.0, 0.0]], 400, 12);
    let start = Month::new(1990, 1).unwrap();
    let frame = DataFrame::monthly(
        (0..400).map(|i| Month::from_ordinal(start.ordinal() + i)).collect(),
        [("ar", FloatArray::from(values.column(0).to_vec()))],
    )
    .unwrap();

    let fitted = fit_var(&frame, 1).unwrap();
    assert_abs_diff_eq!(fitted.coefs()[0][[0, 0]], 0.6, epsilon = 0.1);
    assert!(fitted.is_stable());
}

// ==================== Forecasting ====================

#[test]
fn test_forecast_recursion() {
    let fitted = fit_var(&var1_frame(300, 4), 1).unwrap();
    let data = fitted.data();
    let last = data.row(data.nrows() - 1).to_owned();

    let forecast = fitted.forecast(2).unwrap();
    let step1 = fitted.intercept() + &fitted.coefs()[0].dot(&last);
    let step2 = fitted.intercept() + &fitted.coefs()[0].dot(&step1);
    for j in 0..2 {
        assert_abs_diff_eq!(forecast[[0, j]], step1[j], epsilon = 1e-10);
        assert_abs_diff_eq!(forecast[[1, j]], step2[j], epsilon = 1e-10);
    }
}

#[test]
fn test_long_forecast_reaches_mean() {
    let fitted = fit_var(&var1_frame(500, 6), 1).unwrap();
    let a = &fitted.coefs()[0];
    let c = fitted.intercept();

    // mean = (I - A)^{-1} c for a 2x2 system
    let m = array![[1.0 - a[[0, 0]], -a[[0, 1]]], [-a[[1, 0]], 1.0 - a[[1, 1]]]];
    let det = m[[0, 0]] * m[[1, 1]] - m[[0, 1]] * m[[1, 0]];
    let mean0 = (m[[1, 1]] * c[0] - m[[0, 1]] * c[1]) / det;
    let mean1 = (-m[[1, 0]] * c[0] + m[[0, 0]] * c[1]) / det;

    let forecast = fitted.forecast(200).unwrap();
    assert_abs_diff_eq!(forecast[[199, 0]], mean0, epsilon = 1e-6);
    assert_abs_diff_eq!(forecast[[199, 1]], mean1, epsilon = 1e-6);
}

#[test]
fn test_forecast_rejects_bad_history() {
    let fitted = fit_var(&var1_frame(100, 2), 2).unwrap();
    assert!(fitted.forecast_from(&Array2::zeros((1, 2)), 3).is_err());
    assert!(fitted.forecast_from(&Array2::zeros((5, 3)), 3).is_err());

    let mut history = Array2::zeros((4, 2));
    history[[3, 0]] = f64::NAN;
    assert!(fitted.forecast_from(&history, 1).is_err());
}

// ==================== Summary ====================

#[test]
fn test_summary() {
    let fitted = fit_var(&var1_frame(300, 10), 1).unwrap();
    let summary = fitted.summary().unwrap();

    assert_eq!(summary.equations.len(), 2);
    assert_eq!(summary.variables, vec!["x", "y"]);
    assert!(summary.is_stable);
    assert_eq!(summary.eigenvalue_moduli.len(), 2);

    let x_eq = &summary.equations[0];
    assert_eq!(x_eq.equation, "x ~ const + L1.x + L1.y");
    assert!(x_eq.coefficients[0].is_intercept());
    // own lag is strongly significant
    assert!(x_eq.coefficients[1].p_value < 1e-6);

    let text = summary.to_string();
    assert!(text.contains("VAR(1)"));
    assert!(text.contains("VAR equation: y ~ const + L1.x + L1.y"));
}

// ==================== Lag Selection ====================

#[test]
fn test_select_order_warns_on_missing_values() {
    let mut values = simulate_var1(C, A, 200, 13);
    values[[50, 0]] = f64::NAN;
    let selection = select_order(
        &to_frame(&values, ["x", "y"]),
        4,
        &[InformationCriterion::Aic],
    )
    .unwrap();

    // 196 candidate targets, of which 50..=54 touch row 50
    assert_eq!(selection.nobs, 191);
    assert_eq!(selection.scores.len(), 4);
    assert_eq!(selection.best(InformationCriterion::Aic), Some(1));
}

#[test]
fn test_select_order_uses_common_sample() {
    let frame = var1_frame(200, 13);
    let selection = select_order(&frame, 6, &[InformationCriterion::Aic]).unwrap();

    assert_eq!(selection.max_lags, 6);
    assert_eq!(selection.nobs, 194);
    assert_eq!(selection.scores.len(), 6);
    assert_eq!(
        selection.scores.iter().map(|s| s.lag).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert_eq!(selection.selected.len(), 1);
    assert!(selection.best(InformationCriterion::Bic).is_none());
    assert_eq!(selection.preferred(), selection.best(InformationCriterion::Aic));
}

#[test]
fn test_select_order_recovers_var1() {
    let mut aic_hits = 0;
    let mut bic_hits = 0;
    for seed in 0..10 {
        let selection = select_order(
            &var1_frame(300, 100 + seed),
            8,
            &[InformationCriterion::Aic, InformationCriterion::Bic],
        )
        .unwrap();
        aic_hits += usize::from(selection.best(InformationCriterion::Aic) == Some(1));
        bic_hits += usize::from(selection.best(InformationCriterion::Bic) == Some(1));
    }
    assert!(bic_hits >= 9, "BIC picked lag 1 in {} of 10 draws", bic_hits);
    assert!(aic_hits >= 6, "AIC picked lag 1 in {} of 10 draws", aic_hits);
}

#[test]
fn test_select_order_all_criteria_by_default() {
    let selection = select_order(&var1_frame(150, 3), 4, &[]).unwrap();
    let keys: Vec<InformationCriterion> = selection.selected.keys().copied().collect();
    assert_eq!(keys, InformationCriterion::ALL.to_vec());
}

#[test]
fn test_select_order_rejects_bad_max_lags() {
    let frame = var1_frame(30, 1);
    assert!(matches!(
        select_order(&frame, 0, &[]),
        Err(ModelError::InvalidMaxLag(0))
    ));
    // (30 - 2 - 1) / 3 = 9
    assert_eq!(lag_order::max_estimable_lag(30, 2), 9);
    assert!(select_order(&frame, 9, &[]).is_ok());
    assert!(matches!(
        select_order(&frame, 10, &[]),
        Err(ModelError::InsufficientData { .. })
    ));
}

#[test]
fn test_criterion_parsing() {
    assert_eq!("AIC".parse::<InformationCriterion>().unwrap(), InformationCriterion::Aic);
    assert_eq!(" hqic ".parse::<InformationCriterion>().unwrap(), InformationCriterion::Hqic);
    assert!("mdl".parse::<InformationCriterion>().is_err());
    assert_eq!(InformationCriterion::Fpe.to_string(), "fpe");
}
