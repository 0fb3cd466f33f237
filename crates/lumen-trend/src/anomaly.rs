//! Residual outliers on a trailing window
//!
//! The anomaly model is refit on the most recent window only, so recent
//! volatility is judged against recent behaviour rather than the smoothed
//! long-range line.

use crate::regression::RegressionModel;
use chrono::{DateTime, Utc};
use lumen_core::data_model::{shift_by_days, MAX_SPAN_DAYS};
use lumen_core::stats::population_std_dev;
use lumen_core::{LumenError, MetricSample, Result};
use serde::{Deserialize, Serialize};

/// Residual spread at or below this is treated as a perfect fit
const RESIDUAL_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Value the window fit expected at this timestamp
    pub expected: f64,
    pub residual: f64,
    /// Residual in units of the residual standard deviation
    pub z_score: f64,
}

/// Samples no older than `window_days` before the newest sample.
///
/// A window of `MAX_SPAN_DAYS` or more (including infinity) keeps every sample.
pub fn trailing_window(samples: &[MetricSample], window_days: f64) -> Vec<MetricSample> {
    let Some(newest) = samples.iter().map(|s| s.timestamp).max() else {
        return Vec::new();
    };
    if window_days >= MAX_SPAN_DAYS {
        return samples.to_vec();
    }
    let start = shift_by_days(newest, -window_days);
    samples
        .iter()
        .filter(|s| s.timestamp >= start)
        .copied()
        .collect()
}

/// Flag samples in the trailing window whose residual exceeds `k` standard
/// deviations of the window residuals.
pub fn detect_anomalies(
    samples: &[MetricSample],
    window_days: f64,
    k: f64,
) -> Result<Vec<Anomaly>> {
    let window = trailing_window(samples, window_days);
    if window.len() < 2 {
        return Err(LumenError::insufficient(2, window.len()));
    }

    let model = RegressionModel::fit(&window)?;
    let residuals: Vec<f64> = window
        .iter()
        .map(|s| s.value - model.fitted_value(s.timestamp))
        .collect();

    let std_dev = population_std_dev(&residuals).unwrap_or(0.0);
    if std_dev <= RESIDUAL_FLOOR {
        return Ok(Vec::new());
    }

    let threshold = k * std_dev;
    Ok(window
        .iter()
        .zip(&residuals)
        .filter(|(_, r)| r.abs() > threshold)
        .map(|(s, r)| Anomaly {
            timestamp: s.timestamp,
            value: s.value,
            expected: s.value - r,
            residual: *r,
            z_score: r / std_dev,
        })
        .collect())
}
