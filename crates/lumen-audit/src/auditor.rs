//! Cross-source auditor
//!
//! Reconciles every allow-listed metric across the sources that reported it,
//! re-derives the composite score from each source's pillars, and folds the
//! rows into a verdict. Reports are memoised in an injected [`TtlCache`]
//! keyed by a fingerprint of the inputs, so a duplicate delivery of the same
//! data within the TTL returns the original report (same audit id).

use crate::config::AuditConfig;
use crate::metric::{missing_pillars, non_finite_metrics, AuditMetric, MetricValues, Pillar, PillarScores, SourceSet};
use crate::snapshot::{MonthlySnapshot, SnapshotStore};
use crate::validation::{RowStatus, ValidationResult};
use crate::verdict::{AuditReport, AuditVerdict, VerdictStatus};
use lumen_core::fingerprint::Fingerprint;
use lumen_core::{Clock, Result, SystemClock, TtlCache, YearMonth};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const STORED: &str = "stored";
const RECOMPUTED: &str = "recomputed";

pub struct Auditor {
    config: AuditConfig,
    clock: Arc<dyn Clock>,
    cache: Option<TtlCache<String, AuditReport>>,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            cache: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cache(mut self, cache: TtlCache<String, AuditReport>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn reset_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    /// Audit one brand's sources
    pub fn audit(&mut self, brand: &str, sources: &SourceSet) -> AuditReport {
        let fingerprint = fingerprint_sources(brand, sources);
        let cache_key = format!("{}|{}", brand, fingerprint);

        if let Some(cache) = self.cache.as_mut() {
            if let Some(hit) = cache.get(&cache_key) {
                debug!(brand, audit_id = %hit.verdict.id, "audit cache hit");
                return hit;
            }
        }

        let results = self.validate(sources);
        for row in results.iter().filter(|r| r.is_skipped()) {
            debug!(brand, metric = %row.metric, "{}", row.observation);
        }

        let verdict = AuditVerdict::from_results(brand, self.clock.now(), fingerprint, &results, &self.config);
        match verdict.status {
            VerdictStatus::Critical => warn!(
                brand,
                inconsistencies = verdict.inconsistencies_found,
                max_divergence = verdict.max_divergence,
                "audit verdict critical"
            ),
            status => info!(
                brand,
                inconsistencies = verdict.inconsistencies_found,
                max_divergence = verdict.max_divergence,
                "audit verdict {}",
                status
            ),
        }

        let report = AuditReport { verdict, results };
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(cache_key, report.clone());
        }
        report
    }

    /// Audit, then upsert the month's pillar snapshot into `store`
    pub fn audit_and_snapshot(
        &mut self,
        brand: &str,
        sources: &SourceSet,
        store: &dyn SnapshotStore,
    ) -> Result<AuditReport> {
        let report = self.audit(brand, sources);
        match self.snapshot_for(&report, sources) {
            Some(snapshot) => {
                let month = snapshot.month;
                if store.upsert(snapshot)? {
                    debug!(brand, %month, "replaced monthly snapshot");
                }
            }
            None => warn!(brand, "no source reported all pillars, snapshot not written"),
        }
        Ok(report)
    }

    /// Build the monthly snapshot row for a finished audit.
    ///
    /// Pillars come from the configured primary source, or else the first
    /// source by name with all five pillars finite. The composite is that
    /// source's stored overall score, falling back to the recomputed one when
    /// the stored score is absent or non-finite.
    pub fn snapshot_for(&self, report: &AuditReport, sources: &SourceSet) -> Option<MonthlySnapshot> {
        let primary = self
            .config
            .primary_source
            .as_ref()
            .and_then(|name| sources.get(name))
            .filter(|values| PillarScores::from_values(values).is_some());

        let values = primary.or_else(|| {
            sources
                .values()
                .find(|values| PillarScores::from_values(values).is_some())
        })?;
        let pillars = PillarScores::from_values(values)?;
        let composite = values
            .get(&AuditMetric::OverallScore)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or_else(|| pillars.composite());
        if !composite.is_finite() {
            return None;
        }

        let verdict = &report.verdict;
        Some(MonthlySnapshot {
            brand: verdict.brand.clone(),
            month: YearMonth::from_datetime(verdict.audited_at),
            pillars,
            composite,
            status: verdict.status,
            audit_id: verdict.id,
            recorded_at: verdict.audited_at,
        })
    }

    /// Rows for every reported metric, then one composite formula row per
    /// source that reports pillars
    pub fn validate(&self, sources: &SourceSet) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        for metric in AuditMetric::ALL {
            let values: BTreeMap<String, f64> = sources
                .iter()
                .filter_map(|(name, values)| {
                    values
                        .get(&metric)
                        .filter(|v| v.is_finite())
                        .map(|v| (name.clone(), *v))
                })
                .collect();
            if values.is_empty() {
                continue;
            }
            results.push(ValidationResult::compare(metric.as_str(), values, &self.config));
        }

        for (name, values) in sources {
            let missing = missing_pillars(values);
            if missing.len() == 5 {
                continue;
            }
            results.push(self.composite_row(name, values, &missing));
        }

        results
    }

    fn composite_row(
        &self,
        source: &str,
        values: &MetricValues,
        missing: &[Pillar],
    ) -> ValidationResult {
        let metric = format!("composite_formula[{}]", source);
        let stored = values
            .get(&AuditMetric::OverallScore)
            .copied()
            .filter(|v| v.is_finite());
        let recomputed = PillarScores::from_values(values)
            .map(|p| p.composite())
            .filter(|v| v.is_finite());

        let mut compared = BTreeMap::new();
        if let Some(v) = stored {
            compared.insert(STORED.to_string(), v);
        }
        if let Some(v) = recomputed {
            compared.insert(RECOMPUTED.to_string(), v);
        }

        let mut row = ValidationResult::compare(metric, compared, &self.config);
        if row.status == RowStatus::InsufficientSources {
            let mut reasons = Vec::new();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|p| p.metric().as_str()).collect();
                reasons.push(format!("missing pillars: {}", names.join(", ")));
            }
            let bad: Vec<&str> = non_finite_metrics(values)
                .into_iter()
                .filter(|m| *m == AuditMetric::OverallScore || m.pillar().is_some())
                .map(|m| m.as_str())
                .collect();
            if !bad.is_empty() {
                reasons.push(format!("non-finite values: {}", bad.join(", ")));
            }
            if !values.contains_key(&AuditMetric::OverallScore) {
                reasons.push("no stored overall_score to check the formula against".to_string());
            }
            if reasons.is_empty() {
                reasons.push("weighted pillars are not finite".to_string());
            }
            row.observation = format!("cannot check composite formula: {}", reasons.join("; "));
        } else if row.status.is_inconsistent() {
            row.observation = format!(
                "stored overall_score {:.2} differs from weighted pillars {:.2}",
                stored.unwrap_or_default(),
                recomputed.unwrap_or_default()
            );
        }
        row
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}

/// Stable fingerprint of a brand's audit inputs
pub fn fingerprint_sources(brand: &str, sources: &SourceSet) -> String {
    sources
        .iter()
        .fold(Fingerprint::new().push_str(brand), |fp, (name, values)| {
            values
                .iter()
                .fold(fp.push_str(name).push_i64(values.len() as i64), |fp, (metric, v)| {
                    fp.push_str(metric.as_str()).push_f64(*v)
                })
        })
        .finish()
}
