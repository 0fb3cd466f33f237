//! Data model: samples, alert events and calendar months
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Longest span, in days, a window or horizon may cover
pub const MAX_SPAN_DAYS: f64 = 36_500.0;

/// One observation of a numeric metric.
///
/// Samples are ordered by timestamp. Two samples may share a timestamp;
/// nothing deduplicates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Fractional days elapsed since `origin` (negative if before it)
    pub fn days_since(&self, origin: DateTime<Utc>) -> f64 {
        days_between(origin, self.timestamp)
    }
}

/// Fractional days from `from` to `to`
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0 / SECONDS_PER_DAY,
        None => delta.num_seconds() as f64 / SECONDS_PER_DAY,
    }
}

/// Convert a fractional day count into a chrono duration.
///
/// Saturates at `MAX_SPAN_DAYS` in either direction; `NaN` maps to zero.
pub fn duration_from_days(days: f64) -> Duration {
    let days = if days.is_nan() {
        0.0
    } else {
        days.clamp(-MAX_SPAN_DAYS, MAX_SPAN_DAYS)
    };
    Duration::milliseconds((days * SECONDS_PER_DAY * 1000.0).round() as i64)
}

/// `at` moved by a fractional day count, pinned to chrono's representable range
pub fn shift_by_days(at: DateTime<Utc>, days: f64) -> DateTime<Utc> {
    let delta = duration_from_days(days);
    at.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Sort samples by timestamp, keeping the relative order of equal timestamps
pub fn sort_samples(samples: &mut [MetricSample]) {
    samples.sort_by_key(|s| s.timestamp);
}

/// An alert-worthy occurrence for a brand, grouped by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub category: String,
    pub occurred_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(category: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            category: category.into(),
            occurred_at,
        }
    }
}

/// Calendar month used to key longitudinal snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` when `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
