//! Engine assembly
//!
//! Builds the trend estimator, alert pipeline and audit job from one
//! [`EngineConfig`], wiring the shared clock and TTL caches into each.

use crate::audit_job::AuditJob;
use crate::config::EngineConfig;
use crate::pipeline::{AlertOutcome, AlertPipeline, AlertRequest, BatchSummary};
use crate::ports::{EventStore, MetricSampleStore, NotificationLog};
use lumen_audit::{AuditReport, Auditor, SnapshotStore, SourceSet};
use lumen_core::{Clock, Result, TtlCache};
use lumen_trend::{TrendAnalysis, TrendEstimator};
use std::sync::Arc;
use tracing::info;

/// The stores the engine reads from and writes to
#[derive(Clone)]
pub struct Ports {
    pub samples: Arc<dyn MetricSampleStore>,
    pub events: Arc<dyn EventStore>,
    pub notifications: Arc<dyn NotificationLog>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

pub struct Engine {
    config: EngineConfig,
    samples: Arc<dyn MetricSampleStore>,
    trend: TrendEstimator,
    alerts: AlertPipeline,
    audits: AuditJob,
}

impl Engine {
    /// Validates `config` before building anything
    pub fn new(config: EngineConfig, ports: Ports, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let mut trend = TrendEstimator::new(config.trend.clone());
        let mut auditor = Auditor::new(config.audit.clone()).with_clock(clock.clone());
        if config.cache.enabled {
            trend = trend.with_cache(TtlCache::with_clock(&config.cache, clock.clone()));
            auditor = auditor.with_cache(TtlCache::with_clock(&config.cache, clock.clone()));
        }

        let alerts = AlertPipeline::new(
            config.alerts.clone(),
            ports.samples.clone(),
            ports.events,
            ports.notifications,
            clock,
        );

        info!(
            cache = config.cache.enabled,
            allowed_variance = config.audit.allowed_variance,
            "lumen engine ready"
        );

        Ok(Self {
            samples: ports.samples,
            audits: AuditJob::new(auditor, ports.snapshots),
            config,
            trend,
            alerts,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full trend analysis of one stored series
    pub fn analyze_trend(&mut self, brand: &str, series: &str) -> Result<TrendAnalysis> {
        let samples = self.samples.samples(brand, series)?;
        self.trend.analyze(&format!("{}/{}", brand, series), &samples)
    }

    pub fn evaluate_alert(&self, request: &AlertRequest) -> Result<AlertOutcome> {
        self.alerts.evaluate(request)
    }

    pub fn run_alert_batch(&self, requests: &[AlertRequest]) -> Result<BatchSummary> {
        self.alerts.run_batch(requests)
    }

    pub fn run_audit(&mut self, brand: &str, sources: &SourceSet) -> Result<AuditReport> {
        self.audits.run(brand, sources)
    }

    pub fn trend_estimator(&self) -> &TrendEstimator {
        &self.trend
    }

    pub fn alert_pipeline(&self) -> &AlertPipeline {
        &self.alerts
    }

    pub fn audit_job(&self) -> &AuditJob {
        &self.audits
    }

    /// Drop memoised trend analyses and audit reports
    pub fn reset_caches(&mut self) {
        self.trend.reset_cache();
        self.audits.auditor_mut().reset_cache();
    }
}
