//! Audit verdict aggregation
//!
//! Three-tier funnel over the validation rows, narrower than the row
//! thresholds: one row over the limit does not fail the whole audit, but
//! compounding issues do. An audit in which no row could be compared is a
//! warning, never consistent.

use crate::config::AuditConfig;
use crate::validation::ValidationResult;
use chrono::{DateTime, Utc};
use lumen_core::LUMEN_VERSION;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Consistent only when every row is ok and the worst divergence stays
/// under this fraction of the allowed variance
pub const CONSISTENT_FRACTION: f64 = 0.4;

/// Most inconsistent rows a warning verdict tolerates
pub const WARNING_MAX_INCONSISTENCIES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Consistent,
    Warning,
    Critical,
}

impl VerdictStatus {
    pub fn aggregate(inconsistencies: usize, max_divergence: f64, config: &AuditConfig) -> Self {
        let allowed = config.allowed_variance;
        if inconsistencies == 0 && max_divergence < CONSISTENT_FRACTION * allowed {
            VerdictStatus::Consistent
        } else if inconsistencies <= WARNING_MAX_INCONSISTENCIES && max_divergence <= allowed {
            VerdictStatus::Warning
        } else {
            VerdictStatus::Critical
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VerdictStatus::Consistent => write!(f, "consistent"),
            VerdictStatus::Warning => write!(f, "warning"),
            VerdictStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Outcome of one audit run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditVerdict {
    pub id: Uuid,
    pub brand: String,
    pub audited_at: DateTime<Utc>,

    /// Fingerprint of the audited source values
    pub fingerprint: String,

    pub inconsistencies_found: usize,

    /// Worst divergence among rows with enough sources, in points
    pub max_divergence: f64,

    /// Rows that could not be compared
    pub skipped_metrics: usize,

    pub status: VerdictStatus,

    /// Engine release that produced the verdict
    pub engine_version: String,
}

impl AuditVerdict {
    pub fn from_results(
        brand: impl Into<String>,
        audited_at: DateTime<Utc>,
        fingerprint: impl Into<String>,
        results: &[ValidationResult],
        config: &AuditConfig,
    ) -> Self {
        let inconsistencies_found = results.iter().filter(|r| r.status.is_inconsistent()).count();
        let skipped_metrics = results.iter().filter(|r| r.is_skipped()).count();
        let divergences: Vec<f64> = results.iter().filter_map(|r| r.divergence).collect();
        let max_divergence = divergences.iter().copied().fold(0.0, f64::max);
        let status = if divergences.is_empty() {
            VerdictStatus::Warning
        } else {
            VerdictStatus::aggregate(inconsistencies_found, max_divergence, config)
        };

        Self {
            id: Uuid::new_v4(),
            brand: brand.into(),
            audited_at,
            fingerprint: fingerprint.into(),
            inconsistencies_found,
            max_divergence,
            skipped_metrics,
            status,
            engine_version: LUMEN_VERSION.to_string(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.status == VerdictStatus::Consistent
    }
}

/// Verdict plus the rows it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub verdict: AuditVerdict,
    pub results: Vec<ValidationResult>,
}

impl AuditReport {
    pub fn result(&self, metric: &str) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.metric == metric)
    }

    pub fn inconsistent(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.status.is_inconsistent())
    }
}
