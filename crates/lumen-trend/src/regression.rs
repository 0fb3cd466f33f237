//! Ordinary least squares over time
//!
//! The x axis is fractional days since the earliest sample; y is the sample
//! value. Fits carry enough state to produce predictions with confidence
//! intervals afterwards without refitting.

use chrono::{DateTime, Utc};
use lumen_core::data_model::{days_between, shift_by_days, MAX_SPAN_DAYS};
use lumen_core::{clamp_score, LumenError, MetricSample, Result};
use serde::{Deserialize, Serialize};

/// Below this, `Σ(x-x̄)²` is treated as zero and the slope defaults to 0
const DEGENERATE_SXX: f64 = 1e-12;

/// Sample count above which the normal critical value is used
const LARGE_SAMPLE: usize = 30;
const T_LARGE_SAMPLE: f64 = 1.96;
const T_SMALL_SAMPLE: f64 = 2.0;

/// Summary of a linear fit.
///
/// `r_squared` is 0 for a constant series (zero total variance), not 1 and
/// not NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub correlation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// A forecast point; `lower <= value <= upper`, all within 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: DateTime<Utc>,
    pub horizon_days: f64,
    pub value: f64,
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub result: RegressionResult,
    pub sample_count: usize,
    origin: DateTime<Utc>,
    last_timestamp: DateTime<Utc>,
    last_x: f64,
    mean_x: f64,
    sxx: f64,
    ss_res: f64,
}

impl RegressionModel {
    /// Fit a line through `samples`. Needs at least two samples with finite values.
    pub fn fit(samples: &[MetricSample]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(LumenError::insufficient(2, samples.len()));
        }
        if let Some(bad) = samples.iter().find(|s| !s.value.is_finite()) {
            return Err(LumenError::InvalidInput(format!(
                "non-finite sample value at {}",
                bad.timestamp
            )));
        }

        let origin = samples.iter().map(|s| s.timestamp).min().unwrap_or(samples[0].timestamp);
        let last_timestamp = samples.iter().map(|s| s.timestamp).max().unwrap_or(origin);

        let n = samples.len() as f64;
        let xs: Vec<f64> = samples.iter().map(|s| s.days_since(origin)).collect();
        let ys: Vec<f64> = samples.iter().map(|s| s.value).collect();

        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        let sxy: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();

        let constant = ys.iter().all(|y| *y == ys[0]) || ss_tot <= f64::EPSILON;

        let (slope, intercept) = if constant {
            (0.0, ys[0])
        } else if sxx.abs() < DEGENERATE_SXX {
            (0.0, mean_y)
        } else {
            let slope = sxy / sxx;
            (slope, mean_y - slope * mean_x)
        };

        let ss_res: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();

        let r_squared = if constant {
            0.0
        } else {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        };

        let sign = if slope > 0.0 {
            1.0
        } else if slope < 0.0 {
            -1.0
        } else {
            0.0
        };
        let correlation = r_squared.abs().sqrt() * sign;

        Ok(Self {
            result: RegressionResult {
                slope,
                intercept,
                r_squared,
                correlation,
            },
            sample_count: samples.len(),
            origin,
            last_timestamp,
            last_x: days_between(origin, last_timestamp),
            mean_x,
            sxx,
            ss_res,
        })
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.last_timestamp
    }

    /// Raw, unclamped line value at day offset `x`
    pub fn predict_at(&self, x: f64) -> f64 {
        self.result.slope * x + self.result.intercept
    }

    /// Raw line value at a timestamp
    pub fn fitted_value(&self, at: DateTime<Utc>) -> f64 {
        self.predict_at(days_between(self.origin, at))
    }

    /// Residual standard error, `sqrt(SSres / (n - 2))`; 0 for two-point fits
    pub fn residual_std_error(&self) -> f64 {
        if self.sample_count > 2 {
            (self.ss_res / (self.sample_count - 2) as f64).sqrt()
        } else {
            0.0
        }
    }

    /// Predict `days_ahead` days past the last observed sample.
    ///
    /// The horizon saturates at `MAX_SPAN_DAYS`; a `NaN` horizon predicts the
    /// last sample's date.
    pub fn prediction_for(&self, days_ahead: f64) -> Prediction {
        let days_ahead = if days_ahead.is_nan() {
            0.0
        } else {
            days_ahead.clamp(-MAX_SPAN_DAYS, MAX_SPAN_DAYS)
        };
        let x = self.last_x + days_ahead;
        let raw = self.predict_at(x);

        let n = self.sample_count as f64;
        let leverage = if self.sxx.abs() < DEGENERATE_SXX {
            0.0
        } else {
            (x - self.mean_x).powi(2) / self.sxx
        };
        let prediction_std_error = self.residual_std_error() * (1.0 + 1.0 / n + leverage).sqrt();
        let t = if self.sample_count > LARGE_SAMPLE {
            T_LARGE_SAMPLE
        } else {
            T_SMALL_SAMPLE
        };
        let margin = t * prediction_std_error;

        Prediction {
            date: shift_by_days(self.last_timestamp, days_ahead),
            horizon_days: days_ahead,
            value: clamp_score(raw),
            confidence_interval: ConfidenceInterval {
                lower: clamp_score(raw - margin),
                upper: clamp_score(raw + margin),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
    }

    fn series(values: &[f64]) -> Vec<MetricSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSample::new(day0() + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_exact_line() {
        let model = RegressionModel::fit(&series(&[40.0, 45.0, 50.0, 55.0])).unwrap();
        assert!((model.result.slope - 5.0).abs() < 1e-9);
        assert!((model.result.intercept - 40.0).abs() < 1e-9);
        assert!((model.result.r_squared - 1.0).abs() < 1e-9);
        assert!((model.result.correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_seven_day_prediction_on_exact_line() {
        let model = RegressionModel::fit(&series(&[40.0, 45.0, 50.0, 55.0])).unwrap();
        let prediction = model.prediction_for(7.0);
        assert!((prediction.value - 90.0).abs() < 1e-6);
        assert_eq!(prediction.date, day0() + Duration::days(10));
        assert!(prediction.confidence_interval.lower <= prediction.value);
        assert!(prediction.confidence_interval.upper >= prediction.value);
    }

    #[test]
    fn test_constant_series_has_zero_r_squared() {
        let model = RegressionModel::fit(&series(&[0.1, 0.1, 0.1, 0.1, 0.1])).unwrap();
        assert_eq!(model.result.r_squared, 0.0);
        assert_eq!(model.result.slope, 0.0);
        assert_eq!(model.result.correlation, 0.0);
        assert!(!model.result.r_squared.is_nan());
    }

    #[test]
    fn test_decreasing_correlation_is_negative() {
        let model = RegressionModel::fit(&series(&[80.0, 71.0, 69.0, 60.0, 52.0])).unwrap();
        assert!(model.result.slope < 0.0);
        assert!(model.result.correlation < 0.0);
        assert!(model.result.r_squared > 0.9);
    }

    #[test]
    fn test_same_timestamp_defaults_slope_to_zero() {
        let t = day0();
        let samples = vec![MetricSample::new(t, 10.0), MetricSample::new(t, 20.0)];
        let model = RegressionModel::fit(&samples).unwrap();
        assert_eq!(model.result.slope, 0.0);
        assert!((model.result.intercept - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_samples() {
        let err = RegressionModel::fit(&series(&[50.0])).unwrap_err();
        assert_eq!(err, LumenError::insufficient(2, 1));
    }

    #[test]
    fn test_rejects_nan() {
        let err = RegressionModel::fit(&series(&[50.0, f64::NAN])).unwrap_err();
        assert!(matches!(err, LumenError::InvalidInput(_)));
    }

    #[test]
    fn test_prediction_clamped_above() {
        let model = RegressionModel::fit(&series(&[80.0, 88.0, 91.0, 99.0, 104.0, 110.0, 119.0])).unwrap();
        let prediction = model.prediction_for(30.0);
        assert_eq!(prediction.value, 100.0);
        assert!(prediction.confidence_interval.upper <= 100.0);
        assert!(prediction.confidence_interval.lower <= prediction.value);
    }

    #[test]
    fn test_prediction_clamped_below() {
        let model = RegressionModel::fit(&series(&[30.0, 24.0, 19.0, 13.0, 9.0, 2.0, 0.0])).unwrap();
        let prediction = model.prediction_for(30.0);
        assert_eq!(prediction.value, 0.0);
        assert_eq!(prediction.confidence_interval.lower, 0.0);
        assert!(prediction.confidence_interval.upper >= prediction.value);
    }

    #[test]
    fn test_interval_widens_with_noise() {
        let clean = RegressionModel::fit(&series(&[50.0, 51.0, 52.0, 53.0, 54.0, 55.0, 56.0])).unwrap();
        let noisy = RegressionModel::fit(&series(&[50.0, 54.0, 49.0, 56.0, 51.0, 58.0, 53.0])).unwrap();
        let width = |m: &RegressionModel| {
            let p = m.prediction_for(7.0);
            p.confidence_interval.upper - p.confidence_interval.lower
        };
        assert!(width(&noisy) > width(&clean));
    }

    #[test]
    fn test_unbounded_horizon_saturates() {
        let model = RegressionModel::fit(&series(&[40.0, 45.0, 50.0, 55.0])).unwrap();
        let far = model.prediction_for(f64::INFINITY);
        assert_eq!(far, model.prediction_for(MAX_SPAN_DAYS));
        assert_eq!(far.horizon_days, MAX_SPAN_DAYS);
        assert_eq!(far.date, day0() + Duration::days(3 + MAX_SPAN_DAYS as i64));
        assert_eq!(far.value, 100.0);
        assert!(far.confidence_interval.lower.is_finite());

        let huge = model.prediction_for(1.0e9);
        assert_eq!(huge.date, far.date);
    }
}
