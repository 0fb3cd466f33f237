//! Per-metric validation rows
//!
//! Divergence is the absolute point difference between the values the
//! sources report, never a percentage of either value. With more than two
//! sources it is the widest pairwise gap (`max - min`).

use crate::config::AuditConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Ok,
    Warning,
    Critical,
    /// Fewer than two sources reported the metric; no divergence computed
    InsufficientSources,
}

impl RowStatus {
    /// Status for a measured divergence
    pub fn for_divergence(divergence: f64, config: &AuditConfig) -> Self {
        if divergence <= config.ok_threshold {
            RowStatus::Ok
        } else if divergence <= config.allowed_variance {
            RowStatus::Warning
        } else {
            RowStatus::Critical
        }
    }

    /// Warning or critical
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, RowStatus::Warning | RowStatus::Critical)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RowStatus::Ok => write!(f, "ok"),
            RowStatus::Warning => write!(f, "warning"),
            RowStatus::Critical => write!(f, "critical"),
            RowStatus::InsufficientSources => write!(f, "insufficient_sources"),
        }
    }
}

/// One reconciled metric in one audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub metric: String,

    /// Value reported by each source that had one
    pub values: BTreeMap<String, f64>,

    /// Absolute point divergence; absent when too few sources reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence: Option<f64>,

    pub status: RowStatus,

    pub observation: String,
}

impl ValidationResult {
    /// Compare whatever values were reported for `metric`.
    ///
    /// NaN and infinite values count as not reported; the observation names
    /// the sources they came from.
    pub fn compare(metric: impl Into<String>, values: BTreeMap<String, f64>, config: &AuditConfig) -> Self {
        let metric = metric.into();
        let (values, rejected): (BTreeMap<String, f64>, BTreeMap<String, f64>) =
            values.into_iter().partition(|(_, v)| v.is_finite());
        let reported: Vec<f64> = values.values().copied().collect();

        let Some(divergence) = lumen_core::stats::max_abs_pairwise_difference(&reported) else {
            let mut observation = match values.keys().next() {
                Some(only) => format!("insufficient sources: only {} reported {}", only, metric),
                None => format!("insufficient sources: no source reported {}", metric),
            };
            if !rejected.is_empty() {
                let names: Vec<&str> = rejected.keys().map(String::as_str).collect();
                observation.push_str(&format!(" (non-finite value from {})", names.join(", ")));
            }
            return Self {
                metric,
                values,
                divergence: None,
                status: RowStatus::InsufficientSources,
                observation,
            };
        };

        let status = RowStatus::for_divergence(divergence, config);
        let observation = match status {
            RowStatus::Ok => format!("{} agrees across {} sources", metric, values.len()),
            _ => format!(
                "{} diverges by {:.2} points across {} sources (allowed {:.2})",
                metric,
                divergence,
                values.len(),
                config.allowed_variance
            ),
        };

        Self {
            metric,
            values,
            divergence: Some(divergence),
            status,
            observation,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.status == RowStatus::InsufficientSources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_identical_values_are_ok() {
        let row = ValidationResult::compare(
            "overall_score",
            values(&[("report", 50.0), ("recomputed", 50.0)]),
            &AuditConfig::default(),
        );
        assert_eq!(row.divergence, Some(0.0));
        assert_eq!(row.status, RowStatus::Ok);
    }

    #[test]
    fn test_six_points_is_critical() {
        let row = ValidationResult::compare(
            "overall_score",
            values(&[("report", 50.0), ("recomputed", 56.0)]),
            &AuditConfig::default(),
        );
        assert_eq!(row.divergence, Some(6.0));
        assert_eq!(row.status, RowStatus::Critical);
        assert!(row.observation.contains("6.00"));
    }

    #[test]
    fn test_status_boundaries() {
        let config = AuditConfig::default();
        assert_eq!(RowStatus::for_divergence(1.0, &config), RowStatus::Ok);
        assert_eq!(RowStatus::for_divergence(1.01, &config), RowStatus::Warning);
        assert_eq!(RowStatus::for_divergence(5.0, &config), RowStatus::Warning);
        assert_eq!(RowStatus::for_divergence(5.01, &config), RowStatus::Critical);
    }

    #[test]
    fn test_widest_gap_across_three_sources() {
        let row = ValidationResult::compare(
            "ctr",
            values(&[("a", 3.0), ("b", 4.5), ("c", 2.0)]),
            &AuditConfig::default(),
        );
        assert_eq!(row.divergence, Some(2.5));
        assert_eq!(row.status, RowStatus::Warning);
    }

    #[test]
    fn test_single_source_is_not_ok() {
        let row = ValidationResult::compare("ctr", values(&[("report", 3.1)]), &AuditConfig::default());
        assert_eq!(row.status, RowStatus::InsufficientSources);
        assert_eq!(row.divergence, None);
        assert!(row.is_skipped());
        assert!(row.observation.contains("only report"));
    }

    #[test]
    fn test_non_finite_value_is_not_reported() {
        let row = ValidationResult::compare(
            "overall_score",
            values(&[("stored", f64::NAN), ("recomputed", 60.0)]),
            &AuditConfig::default(),
        );
        assert_eq!(row.status, RowStatus::InsufficientSources);
        assert_eq!(row.divergence, None);
        assert_eq!(row.values.len(), 1);
        assert!(row.observation.contains("non-finite value from stored"));

        let row = ValidationResult::compare(
            "ctr",
            values(&[("a", 3.0), ("b", f64::INFINITY), ("c", 3.5)]),
            &AuditConfig::default(),
        );
        assert_eq!(row.divergence, Some(0.5));
        assert_eq!(row.status, RowStatus::Ok);
    }
}
