//! Alert pipeline
//!
//! ```text
//! samples + events → derive_metrics → classify → gate → payload
//! ```
//!
//! Interactive evaluation and the background batch share one
//! [`SeverityClassifier`], so both paths classify identically.

use chrono::{DateTime, Utc};
use lumen_alerts::{
    derive_metrics, sort_by_priority, AlertConfig, AlertMetrics, Classification, GateDecision, NotificationGate,
    NotificationPayload, NotificationRecord, SeverityClassifier,
};
use lumen_core::{Clock, LumenError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ports::{EventStore, MetricSampleStore, NotificationLog};

/// What to evaluate: one brand's series and the event category it alerts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub brand: String,
    pub series: String,
    pub category: String,
    /// Human label used in the notification title
    pub subject: String,
}

impl AlertRequest {
    pub fn new(brand: impl Into<String>, series: impl Into<String>, category: impl Into<String>) -> Self {
        let series = series.into();
        Self {
            brand: brand.into(),
            subject: series.clone(),
            series,
            category: category.into(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertOutcome {
    pub request: AlertRequest,
    pub classification: Classification,
    pub gate: GateDecision,
    /// Present when the gate let the notification through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<NotificationPayload>,
}

/// Result of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<AlertOutcome>,
    /// Requests that could not be evaluated, with the reason
    pub skipped: Vec<(AlertRequest, LumenError)>,
}

impl BatchSummary {
    /// Payloads cleared for dispatch, highest priority first
    pub fn dispatch_queue(&self) -> Vec<NotificationPayload> {
        let mut queue: Vec<NotificationPayload> = self
            .outcomes
            .iter()
            .filter_map(|o| o.payload.clone())
            .collect();
        sort_by_priority(&mut queue);
        queue
    }

    pub fn notified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.gate.notify).count()
    }
}

pub struct AlertPipeline {
    classifier: SeverityClassifier,
    gate: NotificationGate,
    config: AlertConfig,
    samples: Arc<dyn MetricSampleStore>,
    events: Arc<dyn EventStore>,
    log: Arc<dyn NotificationLog>,
    clock: Arc<dyn Clock>,
}

impl AlertPipeline {
    pub fn new(
        config: AlertConfig,
        samples: Arc<dyn MetricSampleStore>,
        events: Arc<dyn EventStore>,
        log: Arc<dyn NotificationLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            classifier: SeverityClassifier::default(),
            gate: NotificationGate::new(config.gate.clone()),
            config,
            samples,
            events,
            log,
            clock,
        }
    }

    /// Swap the policy used by both paths
    pub fn with_classifier(mut self, classifier: SeverityClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &SeverityClassifier {
        &self.classifier
    }

    /// Feature vector for one request at `now`
    pub fn metrics_for(&self, request: &AlertRequest, now: DateTime<Utc>) -> Result<AlertMetrics> {
        let samples = self.samples.samples(&request.brand, &request.series)?;
        let events = self.events.events(&request.brand)?;
        derive_metrics(&samples, &events, &request.category, now, &self.config)
    }

    /// Interactive path: classify one request and notify if the gate allows
    pub fn evaluate(&self, request: &AlertRequest) -> Result<AlertOutcome> {
        let now = self.clock.now();
        let metrics = self.metrics_for(request, now)?;
        let classification = self.classifier.classify_with_reason(&metrics);
        self.dispatch(request.clone(), classification, now)
    }

    /// Background path: derive every request's metrics, classify them in one
    /// batch, then gate each. Requests without enough data are skipped.
    pub fn run_batch(&self, requests: &[AlertRequest]) -> Result<BatchSummary> {
        let now = self.clock.now();
        let mut summary = BatchSummary::default();
        let mut ready = Vec::with_capacity(requests.len());

        for request in requests {
            match self.metrics_for(request, now) {
                Ok(metrics) => ready.push((request.clone(), metrics)),
                Err(err) if err.is_insufficient_data() => {
                    debug!(brand = %request.brand, series = %request.series, "skipping: {}", err);
                    summary.skipped.push((request.clone(), err));
                }
                Err(err) => return Err(err),
            }
        }

        for (request, classification) in self.classifier.classify_batch(&ready) {
            summary.outcomes.push(self.dispatch(request, classification, now)?);
        }

        info!(
            evaluated = summary.outcomes.len(),
            notified = summary.notified(),
            skipped = summary.skipped.len(),
            "alert batch finished"
        );
        Ok(summary)
    }

    fn dispatch(
        &self,
        request: AlertRequest,
        classification: Classification,
        now: DateTime<Utc>,
    ) -> Result<AlertOutcome> {
        let entity = request.brand.as_str();
        let history = self.log.history(entity)?;
        let gate = self.gate.evaluate(entity, classification.severity, &history, now);

        let payload = if gate.notify {
            self.log
                .record(NotificationRecord::new(entity, classification.severity, now))?;
            if classification.severity.always_notifies() {
                warn!(brand = entity, "{}", classification.reason);
            } else {
                info!(brand = entity, severity = %classification.severity, "notification cleared");
            }
            Some(NotificationPayload::from_classification(
                entity,
                &request.subject,
                &classification,
                now,
            ))
        } else {
            debug!(brand = entity, "{}", gate.reason);
            None
        };

        Ok(AlertOutcome {
            request,
            classification,
            gate,
            payload,
        })
    }
}
