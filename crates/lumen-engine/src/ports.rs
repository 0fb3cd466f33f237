//! Collaborator ports
//!
//! The engine reads samples and events and keeps a notification log through
//! these traits. Persistence lives behind them; the in-memory versions back
//! tests and single-process use.

use chrono::{DateTime, Utc};
use lumen_alerts::NotificationRecord;
use lumen_core::{AlertEvent, LumenError, MetricSample, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Time-ordered samples per brand and series
pub trait MetricSampleStore: Send + Sync {
    /// Samples oldest first
    fn samples(&self, brand: &str, series: &str) -> Result<Vec<MetricSample>>;
}

pub trait EventStore: Send + Sync {
    fn events(&self, brand: &str) -> Result<Vec<AlertEvent>>;
}

pub trait NotificationLog: Send + Sync {
    fn history(&self, entity: &str) -> Result<Vec<NotificationRecord>>;

    fn record(&self, record: NotificationRecord) -> Result<()>;
}

fn poisoned<T>(_: T) -> LumenError {
    LumenError::Store("in-memory store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemorySampleStore {
    series: RwLock<HashMap<(String, String), Vec<MetricSample>>>,
}

impl InMemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, brand: &str, series: &str, sample: MetricSample) -> Result<()> {
        let mut all = self.series.write().map_err(poisoned)?;
        all.entry((brand.to_string(), series.to_string()))
            .or_default()
            .push(sample);
        Ok(())
    }

    pub fn extend(&self, brand: &str, series: &str, samples: impl IntoIterator<Item = MetricSample>) -> Result<()> {
        let mut all = self.series.write().map_err(poisoned)?;
        all.entry((brand.to_string(), series.to_string()))
            .or_default()
            .extend(samples);
        Ok(())
    }
}

impl MetricSampleStore for InMemorySampleStore {
    fn samples(&self, brand: &str, series: &str) -> Result<Vec<MetricSample>> {
        let all = self.series.read().map_err(poisoned)?;
        let mut samples = all
            .get(&(brand.to_string(), series.to_string()))
            .cloned()
            .unwrap_or_default();
        lumen_core::data_model::sort_samples(&mut samples);
        Ok(samples)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<String, Vec<AlertEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, brand: &str, event: AlertEvent) -> Result<()> {
        let mut all = self.events.write().map_err(poisoned)?;
        all.entry(brand.to_string()).or_default().push(event);
        Ok(())
    }
}

impl EventStore for InMemoryEventStore {
    fn events(&self, brand: &str) -> Result<Vec<AlertEvent>> {
        let all = self.events.read().map_err(poisoned)?;
        Ok(all.get(brand).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationLog {
    records: RwLock<Vec<NotificationRecord>>,
}

impl InMemoryNotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records sent at or after `at`, across entities
    pub fn sent_since(&self, at: DateTime<Utc>) -> Result<Vec<NotificationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().filter(|r| r.sent_at >= at).cloned().collect())
    }
}

impl NotificationLog for InMemoryNotificationLog {
    fn history(&self, entity: &str) -> Result<Vec<NotificationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().filter(|r| r.entity == entity).cloned().collect())
    }

    fn record(&self, record: NotificationRecord) -> Result<()> {
        self.records.write().map_err(poisoned)?.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use lumen_alerts::Severity;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_samples_come_back_ordered() {
        let store = InMemorySampleStore::new();
        store.push("acme", "geo", MetricSample::new(t0() + Duration::days(2), 3.0)).unwrap();
        store.push("acme", "geo", MetricSample::new(t0(), 1.0)).unwrap();
        store.push("acme", "seo", MetricSample::new(t0(), 9.0)).unwrap();

        let values: Vec<f64> = store.samples("acme", "geo").unwrap().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 3.0]);
        assert!(store.samples("globex", "geo").unwrap().is_empty());
    }

    #[test]
    fn test_notification_log_per_entity() {
        let log = InMemoryNotificationLog::new();
        log.record(NotificationRecord::new("acme", Severity::High, t0())).unwrap();
        log.record(NotificationRecord::new("globex", Severity::Low, t0() + Duration::hours(1))).unwrap();

        assert_eq!(log.history("acme").unwrap().len(), 1);
        assert_eq!(log.sent_since(t0() + Duration::minutes(30)).unwrap().len(), 1);
        assert_eq!(log.len(), 2);
    }
}
