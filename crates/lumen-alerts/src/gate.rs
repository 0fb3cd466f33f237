//! Notification gate
//!
//! Bounds alert fatigue with a minimum re-notification interval per tier:
//! critical always goes out; high, medium and low wait out their interval
//! since the entity's most recent notification of any tier.

use crate::config::{GateConfig, MAX_INTERVAL_HOURS};
use crate::severity::Severity;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A notification that was already sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub entity: String,
    pub severity: Severity,
    pub sent_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn new(entity: impl Into<String>, severity: Severity, sent_at: DateTime<Utc>) -> Self {
        Self {
            entity: entity.into(),
            severity,
            sent_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub notify: bool,
    pub reason: String,
    /// When a suppressed notification would next be allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_eligible_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    config: GateConfig,
}

impl NotificationGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// `None` means the tier is never rate limited. Intervals are capped at
    /// `MAX_INTERVAL_HOURS`.
    pub fn min_interval(&self, severity: Severity) -> Option<Duration> {
        let hours = match severity {
            Severity::Critical => return None,
            Severity::High => self.config.high_interval_hours,
            Severity::Medium => self.config.medium_interval_hours,
            Severity::Low => self.config.low_interval_hours,
        };
        Some(Duration::hours(hours.clamp(0, MAX_INTERVAL_HOURS)))
    }

    pub fn evaluate(
        &self,
        entity: &str,
        severity: Severity,
        history: &[NotificationRecord],
        now: DateTime<Utc>,
    ) -> GateDecision {
        let Some(interval) = self.min_interval(severity) else {
            return GateDecision {
                notify: true,
                reason: "critical alerts always notify".to_string(),
                next_eligible_at: None,
            };
        };

        let last_sent = history
            .iter()
            .filter(|r| r.entity == entity)
            .map(|r| r.sent_at)
            .max();

        match last_sent {
            Some(sent_at) if now - sent_at < interval => {
                tracing::debug!(entity, severity = %severity, "notification suppressed by gate");
                GateDecision {
                    notify: false,
                    reason: format!(
                        "{} notification suppressed: last notice {} minutes ago, interval is {} hours",
                        severity.as_str(),
                        (now - sent_at).num_minutes(),
                        interval.num_hours()
                    ),
                    next_eligible_at: sent_at.checked_add_signed(interval),
                }
            }
            Some(_) => GateDecision {
                notify: true,
                reason: format!("{} interval elapsed since last notice", severity.as_str()),
                next_eligible_at: None,
            },
            None => GateDecision {
                notify: true,
                reason: "no prior notifications for this entity".to_string(),
                next_eligible_at: None,
            },
        }
    }

    pub fn should_notify(
        &self,
        entity: &str,
        severity: Severity,
        history: &[NotificationRecord],
        now: DateTime<Utc>,
    ) -> bool {
        self.evaluate(entity, severity, history, now).notify
    }
}
