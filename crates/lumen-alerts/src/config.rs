//! Alerting settings

use serde::{Deserialize, Serialize};

/// Longest frequency window or streak gap, in days
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Longest re-notification interval, in hours
pub const MAX_INTERVAL_HOURS: i64 = MAX_WINDOW_DAYS * 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    /// Trailing window for the frequency feature, in days
    pub frequency_window_days: i64,

    /// Largest gap between events that still continues a streak, in days
    pub streak_gap_days: i64,

    pub gate: GateConfig,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            frequency_window_days: 30,
            streak_gap_days: 7,
            gate: GateConfig::default(),
        }
    }
}

/// Minimum re-notification interval per tier. Critical is never limited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    pub high_interval_hours: i64,
    pub medium_interval_hours: i64,
    pub low_interval_hours: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            high_interval_hours: 24,
            medium_interval_hours: 12,
            low_interval_hours: 6,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.frequency_window_days) {
            return Err(format!("frequency_window_days must be between 1 and {}", MAX_WINDOW_DAYS));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.streak_gap_days) {
            return Err(format!("streak_gap_days must be between 1 and {}", MAX_WINDOW_DAYS));
        }
        let gate = &self.gate;
        let intervals = [gate.high_interval_hours, gate.medium_interval_hours, gate.low_interval_hours];
        if intervals.iter().any(|h| !(0..=MAX_INTERVAL_HOURS).contains(h)) {
            return Err(format!("notification intervals must be between 0 and {} hours", MAX_INTERVAL_HOURS));
        }
        Ok(())
    }
}
