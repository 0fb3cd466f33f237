//! Integration tests for lumen-trend.
//!
//! These exercise the estimator through its public API on hand-built
//! score series.

use chrono::{DateTime, Duration, TimeZone, Utc};
use lumen_core::MetricSample;
use lumen_trend::{RegressionModel, TrendConfig, TrendDirection, TrendEstimator};

fn day0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
}

fn on_line(slope: f64, intercept: f64, xs: &[f64]) -> Vec<MetricSample> {
    xs.iter()
        .map(|x| {
            let at = day0() + Duration::minutes((x * 1440.0).round() as i64);
            MetricSample::new(at, slope * x + intercept)
        })
        .collect()
}

// =============================================================================
// Line recovery
// =============================================================================

#[test]
fn test_recovers_exact_lines() {
    let cases = [
        (5.0, 40.0),
        (-1.25, 90.0),
        (0.0, 33.0),
        (0.3, 12.5),
    ];
    let xs = [0.0, 1.0, 2.5, 4.0, 9.0, 10.0];

    for (m, b) in cases {
        let model = RegressionModel::fit(&on_line(m, b, &xs)).unwrap();
        assert!((model.result.slope - m).abs() < 1e-6, "slope for {}x+{}", m, b);
        assert!((model.result.intercept - b).abs() < 1e-6, "intercept for {}x+{}", m, b);
        if m != 0.0 {
            assert!((model.result.r_squared - 1.0).abs() < 1e-9);
        } else {
            // A flat line is a constant series
            assert_eq!(model.result.r_squared, 0.0);
        }
    }
}

#[test]
fn test_two_points_are_enough_for_a_fit() {
    let model = RegressionModel::fit(&on_line(2.0, 10.0, &[0.0, 3.0])).unwrap();
    assert!((model.result.slope - 2.0).abs() < 1e-9);
    assert_eq!(model.residual_std_error(), 0.0);
}

#[test]
fn test_constant_series_r_squared_is_exactly_zero() {
    for value in [0.0, 37.3, 100.0] {
        let samples: Vec<MetricSample> = (0..12)
            .map(|i| MetricSample::new(day0() + Duration::days(i), value))
            .collect();
        let model = RegressionModel::fit(&samples).unwrap();
        assert_eq!(model.result.r_squared, 0.0);
    }
}

// =============================================================================
// Prediction bounds
// =============================================================================

#[test]
fn test_predictions_always_bounded_and_ordered() {
    let estimator = TrendEstimator::default();
    let shapes: Vec<Vec<f64>> = vec![
        vec![95.0, 97.0, 99.0, 98.0, 100.0, 100.0, 99.0],
        vec![5.0, 3.0, 4.0, 1.0, 0.0, 2.0, 0.0],
        vec![10.0, 90.0, 15.0, 85.0, 20.0, 80.0, 50.0],
        vec![50.0; 8],
        vec![60.0, 58.0, 55.0, 57.0, 52.0, 50.0, 49.0, 45.0, 44.0, 41.0],
    ];

    for values in shapes {
        let samples: Vec<MetricSample> = values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSample::new(day0() + Duration::days(i as i64), *v))
            .collect();
        for horizon in [0.0, 1.0, 7.0, 30.0, 365.0] {
            let p = estimator.forecast(&samples, horizon).unwrap();
            let ci = p.confidence_interval;
            assert!((0.0..=100.0).contains(&p.value));
            assert!((0.0..=100.0).contains(&ci.lower));
            assert!((0.0..=100.0).contains(&ci.upper));
            assert!(ci.lower <= p.value && p.value <= ci.upper);
        }
    }
}

#[test]
fn test_large_samples_use_narrower_critical_value() {
    // Same residual pattern, one series with 30 points and one with 31
    let make = |n: i64| -> Vec<MetricSample> {
        (0..n)
            .map(|i| {
                let jitter = if i % 2 == 0 { 1.0 } else { -1.0 };
                MetricSample::new(day0() + Duration::days(i), 50.0 + jitter)
            })
            .collect()
    };
    let small = RegressionModel::fit(&make(30)).unwrap().prediction_for(0.0);
    let large = RegressionModel::fit(&make(31)).unwrap().prediction_for(0.0);
    let width = |p: &lumen_trend::Prediction| p.confidence_interval.upper - p.confidence_interval.lower;
    assert!(width(&large) < width(&small));
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_worked_example() {
    let samples = on_line(5.0, 40.0, &[0.0, 1.0, 2.0, 3.0]);
    let model = RegressionModel::fit(&samples).unwrap();
    assert!((model.result.slope - 5.0).abs() < 1e-9);
    assert!((model.result.intercept - 40.0).abs() < 1e-9);
    assert!((model.result.r_squared - 1.0).abs() < 1e-9);

    let week_out = model.prediction_for(7.0);
    assert!((week_out.value - 90.0).abs() < 1e-6);
}

#[test]
fn test_declining_brand_analysis() {
    let config = TrendConfig {
        forecast_horizons: vec![7.0],
        ..Default::default()
    };
    let mut estimator = TrendEstimator::new(config);
    let mut samples: Vec<MetricSample> = (0..21)
        .map(|i| MetricSample::new(day0() + Duration::days(i), 72.0 - 0.8 * i as f64))
        .collect();
    // One bad crawl day
    samples[17].value = 20.0;

    let analysis = estimator.analyze("acme/geo", &samples).unwrap();
    assert_eq!(analysis.direction, TrendDirection::Decreasing);
    assert_eq!(analysis.predictions.len(), 1);
    assert!(analysis
        .anomalies
        .iter()
        .any(|a| a.timestamp == day0() + Duration::days(17)));
}
