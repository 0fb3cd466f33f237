//! Alert feature vector

use lumen_core::clamp_score;
use serde::{Deserialize, Serialize};

pub const TREND_MIN: f64 = -100.0;
pub const TREND_MAX: f64 = 100.0;

/// Inputs to the severity classifier. Derived fresh for every call and never
/// persisted; only the resulting severity and reason are.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertMetrics {
    /// Current score, 0-100
    pub score: f64,
    /// Change between the two most recent samples, -100..100
    pub trend: f64,
    /// Same-category events in the trailing window
    pub frequency: u32,
    /// Trend per day; unbounded
    pub velocity: f64,
    /// Days since the current streak began
    pub duration: f64,
}

impl AlertMetrics {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            ..Default::default()
        }
    }

    pub fn with_trend(mut self, trend: f64) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Copy with every bounded feature pulled into range.
    ///
    /// Velocity keeps its magnitude; only a `NaN` velocity is zeroed.
    pub fn clamped(&self) -> Self {
        Self {
            score: clamp_score(self.score),
            trend: if self.trend.is_nan() {
                0.0
            } else {
                self.trend.clamp(TREND_MIN, TREND_MAX)
            },
            frequency: self.frequency,
            velocity: if self.velocity.is_nan() { 0.0 } else { self.velocity },
            duration: if self.duration.is_nan() {
                0.0
            } else {
                self.duration.max(0.0)
            },
        }
    }
}
