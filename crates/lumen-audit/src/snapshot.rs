//! Monthly pillar snapshots for longitudinal charts
//!
//! One row per `(brand, month)`. Re-running an audit in the same month
//! replaces that month's row instead of adding another.

use crate::metric::PillarScores;
use crate::verdict::VerdictStatus;
use chrono::{DateTime, Utc};
use lumen_core::{LumenError, Result, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    pub brand: String,
    pub month: YearMonth,
    pub pillars: PillarScores,
    pub composite: f64,
    pub status: VerdictStatus,
    /// Audit that wrote this row
    pub audit_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

impl MonthlySnapshot {
    pub fn key(&self) -> (String, YearMonth) {
        (self.brand.clone(), self.month)
    }
}

/// Storage for monthly snapshots. Implementations must enforce uniqueness on
/// `(brand, month)`.
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace; returns `true` when an existing row was replaced
    fn upsert(&self, snapshot: MonthlySnapshot) -> Result<bool>;

    fn get(&self, brand: &str, month: YearMonth) -> Result<Option<MonthlySnapshot>>;

    /// Every snapshot for `brand`, oldest month first
    fn series(&self, brand: &str) -> Result<Vec<MonthlySnapshot>>;
}

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    rows: RwLock<BTreeMap<(String, YearMonth), MonthlySnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> LumenError {
    LumenError::Store("snapshot store lock poisoned".to_string())
}

impl SnapshotStore for InMemorySnapshotStore {
    fn upsert(&self, snapshot: MonthlySnapshot) -> Result<bool> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        Ok(rows.insert(snapshot.key(), snapshot).is_some())
    }

    fn get(&self, brand: &str, month: YearMonth) -> Result<Option<MonthlySnapshot>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&(brand.to_string(), month)).cloned())
    }

    fn series(&self, brand: &str) -> Result<Vec<MonthlySnapshot>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .iter()
            .filter(|((b, _), _)| b == brand)
            .map(|(_, snapshot)| snapshot.clone())
            .collect())
    }
}
