//! Outbound notification payload handed to the external notifier

use crate::classifier::Classification;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub entity: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub priority_rank: u8,
    pub created_at: DateTime<Utc>,
}

impl NotificationPayload {
    pub fn from_classification(
        entity: impl Into<String>,
        subject: &str,
        classification: &Classification,
        created_at: DateTime<Utc>,
    ) -> Self {
        let entity = entity.into();
        let severity = classification.severity;
        Self {
            title: format!("[{}] {} alert for {}", severity, subject, entity),
            message: classification.reason.clone(),
            priority_rank: severity.priority_rank(),
            entity,
            severity,
            created_at,
        }
    }
}

/// Highest priority first; ties keep their original order
pub fn sort_by_priority(payloads: &mut [NotificationPayload]) {
    payloads.sort_by(|a, b| b.priority_rank.cmp(&a.priority_rank));
}
