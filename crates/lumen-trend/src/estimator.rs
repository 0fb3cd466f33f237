//! Trend Estimator
//!
//! Wraps the regression, forecasting and anomaly pieces behind the caller
//! minimums from [`TrendConfig`], and memoises full analyses in an injected
//! [`TtlCache`].

use crate::anomaly::{detect_anomalies, Anomaly};
use crate::config::TrendConfig;
use crate::direction::TrendDirection;
use crate::regression::{Prediction, RegressionModel, RegressionResult};
use lumen_core::fingerprint::Fingerprint;
use lumen_core::{LumenError, MetricSample, Result, TtlCache};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything the dashboard needs about one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub series_key: String,
    pub sample_count: usize,
    pub regression: RegressionResult,
    pub direction: TrendDirection,
    pub predictions: Vec<Prediction>,
    pub anomalies: Vec<Anomaly>,
    /// Fingerprint of the samples this analysis was computed from
    pub fingerprint: String,
}

pub struct TrendEstimator {
    config: TrendConfig,
    cache: Option<TtlCache<String, TrendAnalysis>>,
}

impl TrendEstimator {
    pub fn new(config: TrendConfig) -> Self {
        Self { config, cache: None }
    }

    /// Attach a cache for [`TrendEstimator::analyze`] results
    pub fn with_cache(mut self, cache: TtlCache<String, TrendAnalysis>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Drop every memoised analysis
    /// Live cached analyses, or `None` when no cache is attached
    pub fn cached_entries(&mut self) -> Option<usize> {
        self.cache.as_mut().map(|cache| cache.len())
    }

    pub fn reset_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    pub fn fit(&self, samples: &[MetricSample]) -> Result<RegressionModel> {
        let required = self.config.min_regression_samples.max(2);
        if samples.len() < required {
            return Err(LumenError::insufficient(required, samples.len()));
        }
        RegressionModel::fit(samples)
    }

    pub fn regression(&self, samples: &[MetricSample]) -> Result<RegressionResult> {
        self.fit(samples).map(|m| m.result)
    }

    pub fn direction(&self, samples: &[MetricSample]) -> Result<TrendDirection> {
        let result = self.regression(samples)?;
        Ok(TrendDirection::from_slope(
            result.slope,
            self.config.stable_slope_threshold,
        ))
    }

    /// Forecast `days_ahead` past the last sample. Needs the forecast minimum.
    pub fn forecast(&self, samples: &[MetricSample], days_ahead: f64) -> Result<Prediction> {
        Ok(self.forecast_model(samples)?.prediction_for(days_ahead))
    }

    pub fn forecast_series(
        &self,
        samples: &[MetricSample],
        horizons: &[f64],
    ) -> Result<Vec<Prediction>> {
        let model = self.forecast_model(samples)?;
        Ok(horizons.iter().map(|d| model.prediction_for(*d)).collect())
    }

    pub fn anomalies(&self, samples: &[MetricSample]) -> Result<Vec<Anomaly>> {
        detect_anomalies(
            samples,
            self.config.anomaly_window_days,
            self.config.anomaly_k,
        )
    }

    /// Full analysis of one series, served from cache when the same samples
    /// were analysed within the cache TTL.
    pub fn analyze(&mut self, series_key: &str, samples: &[MetricSample]) -> Result<TrendAnalysis> {
        let fingerprint = Fingerprint::new()
            .push_str(series_key)
            .push_samples(samples)
            .finish();
        let cache_key = format!("{}|{}", series_key, fingerprint);

        if let Some(cache) = self.cache.as_mut() {
            if let Some(hit) = cache.get(&cache_key) {
                debug!(series = series_key, "trend analysis cache hit");
                return Ok(hit);
            }
        }

        let model = self.forecast_model(samples)?;
        let predictions = self
            .config
            .forecast_horizons
            .iter()
            .map(|d| model.prediction_for(*d))
            .collect();

        let anomalies = match self.anomalies(samples) {
            Ok(found) => found,
            Err(err) if err.is_insufficient_data() => {
                debug!(series = series_key, "anomaly window too sparse, none flagged");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let analysis = TrendAnalysis {
            series_key: series_key.to_string(),
            sample_count: samples.len(),
            regression: model.result,
            direction: TrendDirection::from_slope(
                model.result.slope,
                self.config.stable_slope_threshold,
            ),
            predictions,
            anomalies,
            fingerprint,
        };

        debug!(
            series = series_key,
            slope = analysis.regression.slope,
            r_squared = analysis.regression.r_squared,
            anomalies = analysis.anomalies.len(),
            "trend analysis computed"
        );

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(cache_key, analysis.clone());
        }
        Ok(analysis)
    }

    fn forecast_model(&self, samples: &[MetricSample]) -> Result<RegressionModel> {
        let required = self.config.min_forecast_samples.max(2);
        if samples.len() < required {
            return Err(LumenError::insufficient(required, samples.len()));
        }
        RegressionModel::fit(samples)
    }
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use lumen_core::ManualClock;
    use std::sync::Arc;

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn daily(values: &[f64]) -> Vec<MetricSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSample::new(day0() + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_forecast_requires_seven_samples() {
        let estimator = TrendEstimator::default();
        let err = estimator
            .forecast(&daily(&[40.0, 45.0, 50.0, 55.0]), 7.0)
            .unwrap_err();
        assert_eq!(err, LumenError::insufficient(7, 4));

        // The bare regression only needs two
        assert!(estimator.regression(&daily(&[40.0, 45.0])).is_ok());
    }

    #[test]
    fn test_regression_requires_two_samples() {
        let estimator = TrendEstimator::default();
        let err = estimator.regression(&daily(&[40.0])).unwrap_err();
        assert_eq!(err, LumenError::insufficient(2, 1));
    }

    #[test]
    fn test_direction_labels() {
        let estimator = TrendEstimator::default();
        assert_eq!(
            estimator.direction(&daily(&[50.0, 50.05, 50.1])).unwrap(),
            TrendDirection::Stable
        );
        assert_eq!(
            estimator.direction(&daily(&[50.0, 48.0, 46.0])).unwrap(),
            TrendDirection::Decreasing
        );
    }

    #[test]
    fn test_forecast_series_horizons() {
        let estimator = TrendEstimator::default();
        let samples = daily(&[40.0, 42.0, 44.0, 46.0, 48.0, 50.0, 52.0]);
        let predictions = estimator.forecast_series(&samples, &[1.0, 7.0]).unwrap();
        assert_eq!(predictions.len(), 2);
        assert!((predictions[0].value - 54.0).abs() < 1e-6);
        assert!((predictions[1].value - 66.0).abs() < 1e-6);
    }

    #[test]
    fn test_analyze_uses_cache_until_ttl() {
        let clock = Arc::new(ManualClock::new(day0()));
        let cache = TtlCache::new(Duration::seconds(60), 16, clock.clone());
        let mut estimator = TrendEstimator::default().with_cache(cache);
        assert_eq!(estimator.cached_entries(), Some(0));

        let samples = daily(&[40.0, 42.0, 41.0, 45.0, 47.0, 46.0, 50.0, 52.0]);
        let first = estimator.analyze("brand-1/overall", &samples).unwrap();
        assert_eq!(first.predictions.len(), 3);
        assert_eq!(first.direction, TrendDirection::Increasing);
        assert_eq!(estimator.cached_entries(), Some(1));

        // A hit must not re-insert, so the entry still expires 60s after the first call
        clock.advance(Duration::seconds(50));
        let second = estimator.analyze("brand-1/overall", &samples).unwrap();
        assert_eq!(first, second);
        assert_eq!(estimator.cached_entries(), Some(1));

        clock.advance(Duration::seconds(20));
        assert_eq!(estimator.cached_entries(), Some(0));

        let third = estimator.analyze("brand-1/overall", &samples).unwrap();
        assert_eq!(first, third);
        assert_eq!(estimator.cached_entries(), Some(1));

        estimator.analyze("brand-2/overall", &samples).unwrap();
        assert_eq!(estimator.cached_entries(), Some(2));

        estimator.reset_cache();
        assert_eq!(estimator.cached_entries(), Some(0));
        assert_eq!(TrendEstimator::default().cached_entries(), None);
    }

    #[test]
    fn test_analyze_changed_samples_bypass_cache() {
        let clock = Arc::new(ManualClock::new(day0()));
        let cache = TtlCache::new(Duration::seconds(600), 16, clock);
        let mut estimator = TrendEstimator::default().with_cache(cache);

        let samples = daily(&[40.0, 42.0, 44.0, 46.0, 48.0, 50.0, 52.0]);
        let before = estimator.analyze("b", &samples).unwrap();

        let mut changed = samples.clone();
        changed[6].value = 30.0;
        let after = estimator.analyze("b", &changed).unwrap();

        assert_ne!(before.fingerprint, after.fingerprint);
        assert!(after.regression.slope < before.regression.slope);
    }

    #[test]
    fn test_analyze_insufficient_history() {
        let mut estimator = TrendEstimator::default();
        let err = estimator.analyze("b", &daily(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
