//! Trend estimation settings

use lumen_core::data_model::MAX_SPAN_DAYS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum samples for a bare regression fit
    pub min_regression_samples: usize,

    /// Minimum samples before a forecast is considered meaningful
    pub min_forecast_samples: usize,

    /// Trailing window for the anomaly refit, in days
    pub anomaly_window_days: f64,

    /// Residuals beyond `anomaly_k` standard deviations are anomalies
    pub anomaly_k: f64,

    /// Slopes (points/day) with smaller magnitude are labelled stable
    pub stable_slope_threshold: f64,

    /// Days past the last sample to forecast in a full analysis
    pub forecast_horizons: Vec<f64>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_regression_samples: 2,
            min_forecast_samples: 7,
            anomaly_window_days: 30.0,
            anomaly_k: 2.0,
            stable_slope_threshold: 0.1,
            forecast_horizons: vec![7.0, 14.0, 30.0],
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_regression_samples < 2 {
            return Err("min_regression_samples must be at least 2".to_string());
        }
        if self.min_forecast_samples < self.min_regression_samples {
            return Err("min_forecast_samples must not be below min_regression_samples".to_string());
        }
        if !(self.anomaly_window_days > 0.0 && self.anomaly_window_days <= MAX_SPAN_DAYS) {
            return Err(format!("anomaly_window_days must be in (0, {}]", MAX_SPAN_DAYS));
        }
        if !(self.anomaly_k > 0.0 && self.anomaly_k.is_finite()) {
            return Err("anomaly_k must be positive and finite".to_string());
        }
        if !(self.stable_slope_threshold >= 0.0 && self.stable_slope_threshold.is_finite()) {
            return Err("stable_slope_threshold must be non-negative and finite".to_string());
        }
        if self
            .forecast_horizons
            .iter()
            .any(|h| !(*h >= 0.0 && *h <= MAX_SPAN_DAYS))
        {
            return Err(format!("forecast_horizons must be in [0, {}]", MAX_SPAN_DAYS));
        }
        Ok(())
    }
}
