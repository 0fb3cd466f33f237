//! Lumen Trend: score trajectories and outliers
//!
//! Fits an ordinary least squares line over a score series (x is days since
//! the earliest sample), forecasts future points with confidence intervals,
//! and flags residual outliers on a trailing window.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use lumen_core::MetricSample;
//! use lumen_trend::{TrendEstimator, TrendDirection};
//!
//! let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! let samples: Vec<MetricSample> = (0..10)
//!     .map(|i| MetricSample::new(start + Duration::days(i), 50.0 + i as f64))
//!     .collect();
//!
//! let estimator = TrendEstimator::default();
//! let forecast = estimator.forecast(&samples, 7.0).unwrap();
//! assert!((forecast.value - 66.0).abs() < 1e-6);
//! assert_eq!(estimator.direction(&samples).unwrap(), TrendDirection::Increasing);
//! ```

pub mod anomaly;
pub mod config;
pub mod direction;
pub mod estimator;
pub mod regression;

pub use anomaly::{detect_anomalies, Anomaly};
pub use config::TrendConfig;
pub use direction::TrendDirection;
pub use estimator::{TrendAnalysis, TrendEstimator};
pub use regression::{ConfidenceInterval, Prediction, RegressionModel, RegressionResult};
