//! Audit job: audit a brand, upsert its monthly snapshot, append the rows to
//! the validation history.

use lumen_audit::{AuditReport, Auditor, SnapshotStore, SourceSet, ValidationHistory};
use lumen_core::Result;
use std::sync::Arc;
use tracing::debug;

pub struct AuditJob {
    auditor: Auditor,
    snapshots: Arc<dyn SnapshotStore>,
    history: ValidationHistory,
}

impl AuditJob {
    pub fn new(auditor: Auditor, snapshots: Arc<dyn SnapshotStore>) -> Self {
        let history = ValidationHistory::with_max_entries(auditor.config().history_max_entries);
        Self {
            auditor,
            snapshots,
            history,
        }
    }

    pub fn run(&mut self, brand: &str, sources: &SourceSet) -> Result<AuditReport> {
        let report = self
            .auditor
            .audit_and_snapshot(brand, sources, self.snapshots.as_ref())?;

        let id = report.verdict.id;
        if self.history.entries().iter().any(|e| e.audit_id == id) {
            debug!(brand, audit_id = %id, "duplicate delivery, history unchanged");
        } else {
            self.history.record(&report);
        }
        Ok(report)
    }

    pub fn history(&self) -> &ValidationHistory {
        &self.history
    }

    pub fn snapshots(&self) -> &dyn SnapshotStore {
        self.snapshots.as_ref()
    }

    pub fn auditor_mut(&mut self) -> &mut Auditor {
        &mut self.auditor
    }
}
