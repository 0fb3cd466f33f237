//! Append-only validation history
//!
//! Every audit run appends its rows. Rows are never edited; once the log
//! holds `max_entries` rows the oldest are dropped.

use crate::validation::{RowStatus, ValidationResult};
use crate::verdict::{AuditReport, VerdictStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One validation row tagged with the audit it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub audit_id: Uuid,
    pub brand: String,
    pub audited_at: DateTime<Utc>,
    pub verdict: VerdictStatus,
    pub result: ValidationResult,
}

pub struct ValidationHistory {
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl ValidationHistory {
    pub fn new() -> Self {
        Self::with_max_entries(10_000)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max.max(1),
        }
    }

    /// Append every row of `report`; returns how many rows were added
    pub fn record(&mut self, report: &AuditReport) -> usize {
        let verdict = &report.verdict;
        self.entries.extend(report.results.iter().map(|result| HistoryEntry {
            audit_id: verdict.id,
            brand: verdict.brand.clone(),
            audited_at: verdict.audited_at,
            verdict: verdict.status,
            result: result.clone(),
        }));

        if self.entries.len() > self.max_entries {
            let drain_count = self.entries.len() - self.max_entries;
            self.entries.drain(0..drain_count);
        }
        report.results.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_brand(&self, brand: &str) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|e| e.brand == brand).collect()
    }

    pub fn for_metric(&self, metric: &str) -> Vec<&HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.result.metric == metric)
            .collect()
    }

    pub fn since(&self, at: DateTime<Utc>) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|e| e.audited_at >= at).collect()
    }

    pub fn critical_rows(&self) -> Vec<&HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.result.status == RowStatus::Critical)
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let count = |status: RowStatus| self.entries.iter().filter(|e| e.result.status == status).count();
        let runs: BTreeSet<Uuid> = self.entries.iter().map(|e| e.audit_id).collect();

        HistoryStats {
            runs: runs.len(),
            rows: self.entries.len(),
            ok_rows: count(RowStatus::Ok),
            warning_rows: count(RowStatus::Warning),
            critical_rows: count(RowStatus::Critical),
            skipped_rows: count(RowStatus::InsufficientSources),
            worst_divergence: self
                .entries
                .iter()
                .filter_map(|e| e.result.divergence)
                .fold(0.0, f64::max),
        }
    }

    pub fn to_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ValidationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub runs: usize,
    pub rows: usize,
    pub ok_rows: usize,
    pub warning_rows: usize,
    pub critical_rows: usize,
    pub skipped_rows: usize,
    pub worst_divergence: f64,
}
