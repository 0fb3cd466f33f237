//! Auditor settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    /// Largest divergence, in points, a row may show before it is critical
    pub allowed_variance: f64,

    /// Divergence at or below which a row is ok
    pub ok_threshold: f64,

    /// Source whose pillar values feed the monthly snapshot. When unset the
    /// first source (by name) that reports all five pillars is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_source: Option<String>,

    /// Rows kept by the validation history before the oldest are dropped
    pub history_max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            allowed_variance: 5.0,
            ok_threshold: 1.0,
            primary_source: None,
            history_max_entries: 10_000,
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.allowed_variance.is_finite() && self.allowed_variance > 0.0) {
            return Err("allowed_variance must be positive".to_string());
        }
        if !(self.ok_threshold.is_finite() && self.ok_threshold >= 0.0) {
            return Err("ok_threshold must not be negative".to_string());
        }
        if self.ok_threshold > self.allowed_variance {
            return Err("ok_threshold must not exceed allowed_variance".to_string());
        }
        if self.history_max_entries == 0 {
            return Err("history_max_entries must be at least 1".to_string());
        }
        Ok(())
    }
}
