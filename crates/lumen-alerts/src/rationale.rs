//! Human-readable reasons for a severity
//!
//! The wording depends on the tier and on the last split taken, which is the
//! feature that actually decided the leaf.

use crate::metrics::AlertMetrics;
use crate::severity::Severity;
use crate::tree::{Decision, Feature};

pub fn explain(severity: Severity, metrics: &AlertMetrics, path: &[Decision]) -> String {
    let deciding = path.last().map(|d| d.feature);
    let score = metrics.score;
    let trend = metrics.trend;
    let velocity = metrics.velocity;
    let frequency = metrics.frequency;
    let duration = metrics.duration;

    match (severity, deciding) {
        (Severity::Critical, _) => format!(
            "Critical score of {:.1} with a fast decline: {:+.1} points at {:.1} points/day",
            score, trend, velocity
        ),

        (Severity::High, Some(Feature::Velocity)) => format!(
            "At risk: score {:.1} is dropping quickly ({:+.1} points, {:.1} points/day)",
            score, trend, velocity
        ),
        (Severity::High, Some(Feature::Frequency)) => format!(
            "At risk: score {:.1} with {} occurrences in the trailing window (trend {:+.1})",
            score, frequency, trend
        ),
        (Severity::High, _) => format!(
            "At risk: rapid decline of {:+.1} points to a score of {:.1}",
            trend, score
        ),

        (Severity::Medium, Some(Feature::Velocity)) => format!(
            "Moderate decline: score {:.1} fell {:+.1} points at a controlled {:.1} points/day",
            score, trend, velocity
        ),
        (Severity::Medium, Some(Feature::Frequency)) => format!(
            "Frequent occurrences: {} in the trailing window at score {:.1}",
            frequency, score
        ),
        (Severity::Medium, Some(Feature::Duration)) => format!(
            "Persistent issue: open for {:.0} days at score {:.1}",
            duration, score
        ),
        (Severity::Medium, _) => format!(
            "Moderate decline of {:+.1} points to a score of {:.1}",
            trend, score
        ),

        (Severity::Low, Some(Feature::Duration)) => format!(
            "Healthy: score {:.1} (trend {:+.1}), issue only {:.0} days old, monitoring",
            score, trend, duration
        ),
        (Severity::Low, Some(Feature::Frequency)) => format!(
            "Healthy: score {:.1} with {} recent occurrences, monitoring",
            score, frequency
        ),
        (Severity::Low, _) => format!("Healthy: score {:.1} (trend {:+.1}), monitoring", score, trend),
    }
}
