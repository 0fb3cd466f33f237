//! Lumen Audit: cross-source consistency checks
//!
//! Independent sources (a pre-aggregated report, values recomputed from raw
//! inputs, ...) each report the same allow-listed metrics. The auditor
//! measures how far they diverge, re-derives the composite score from its
//! pillar formula, and raises a verdict.
//!
//! # Example
//!
//! ```
//! use lumen_audit::{AuditMetric, Auditor, MetricValues, RowStatus, SourceSet};
//!
//! let mut sources = SourceSet::new();
//! sources.insert("report".to_string(), MetricValues::from([(AuditMetric::OverallScore, 50.0)]));
//! sources.insert("recomputed".to_string(), MetricValues::from([(AuditMetric::OverallScore, 56.0)]));
//!
//! let report = Auditor::default().audit("acme", &sources);
//! assert_eq!(report.result("overall_score").unwrap().status, RowStatus::Critical);
//! ```

pub mod auditor;
pub mod config;
pub mod consistency;
pub mod history;
pub mod metric;
pub mod snapshot;
pub mod validation;
pub mod verdict;

pub use auditor::{fingerprint_sources, Auditor};
pub use config::AuditConfig;
pub use consistency::{consistency_index, consistency_index_by_provider};
pub use history::{HistoryEntry, HistoryStats, ValidationHistory};
pub use metric::{AuditMetric, MetricValues, Pillar, PillarScores, SourceSet};
pub use snapshot::{InMemorySnapshotStore, MonthlySnapshot, SnapshotStore};
pub use validation::{RowStatus, ValidationResult};
pub use verdict::{AuditReport, AuditVerdict, VerdictStatus};
