//! Severity classifier
//!
//! Pure and deterministic: clamps the metrics, walks the policy tree, and
//! explains the outcome. Interactive and batch callers both go through
//! [`SeverityClassifier`], which defaults to the shared [`DEFAULT_TREE`].

use crate::metrics::AlertMetrics;
use crate::rationale::explain;
use crate::severity::Severity;
use crate::tree::{Decision, DecisionTree, DEFAULT_TREE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    pub reason: String,
    /// Splits taken from the root to the leaf
    pub path: Vec<Decision>,
    /// The metrics after clamping, as the tree saw them
    pub metrics: AlertMetrics,
}

#[derive(Debug, Clone)]
pub struct SeverityClassifier {
    tree: Arc<DecisionTree>,
}

impl SeverityClassifier {
    pub fn new(tree: Arc<DecisionTree>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn classify(&self, metrics: &AlertMetrics) -> Severity {
        self.tree.traverse(&metrics.clamped()).0
    }

    pub fn classify_with_reason(&self, metrics: &AlertMetrics) -> Classification {
        let clamped = metrics.clamped();
        let (severity, path) = self.tree.traverse(&clamped);
        Classification {
            severity,
            reason: explain(severity, &clamped, &path),
            path,
            metrics: clamped,
        }
    }

    /// Classify many entities at once, preserving input order
    pub fn classify_batch<K: Clone>(&self, items: &[(K, AlertMetrics)]) -> Vec<(K, Classification)> {
        items
            .iter()
            .map(|(key, metrics)| (key.clone(), self.classify_with_reason(metrics)))
            .collect()
    }
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::new(Arc::clone(&DEFAULT_TREE))
    }
}

/// Classify with the calibrated policy
pub fn classify(metrics: &AlertMetrics) -> Severity {
    SeverityClassifier::default().classify(metrics)
}

/// Classify with the calibrated policy and explain the outcome
pub fn classify_with_reason(metrics: &AlertMetrics) -> Classification {
    SeverityClassifier::default().classify_with_reason(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{DecisionNode, Feature};

    fn metrics(score: f64, trend: f64, velocity: f64, frequency: u32, duration: f64) -> AlertMetrics {
        AlertMetrics {
            score,
            trend,
            frequency,
            velocity,
            duration,
        }
    }

    #[test]
    fn test_every_leaf_reachable() {
        let cases = [
            (metrics(20.0, -15.0, -6.0, 0, 1.0), Severity::Critical),
            (metrics(20.0, -15.0, -2.0, 0, 1.0), Severity::High),
            (metrics(20.0, 0.0, 0.0, 5, 1.0), Severity::Medium),
            (metrics(20.0, 0.0, 0.0, 6, 1.0), Severity::High),
            (metrics(45.0, -20.0, -9.0, 0, 1.0), Severity::High),
            (metrics(45.0, -20.0, -4.0, 0, 1.0), Severity::Medium),
            (metrics(45.0, 0.0, 0.0, 10, 1.0), Severity::Low),
            (metrics(45.0, 0.0, 0.0, 11, 1.0), Severity::Medium),
            (metrics(80.0, -25.0, -1.0, 7, 1.0), Severity::Medium),
            (metrics(80.0, -25.0, -1.0, 8, 1.0), Severity::High),
            (metrics(80.0, 0.0, 0.0, 0, 7.0), Severity::Low),
            (metrics(80.0, 0.0, 0.0, 0, 8.0), Severity::Medium),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(&input), expected, "{:?}", input);
        }
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let wild = metrics(-40.0, -500.0, -3.0, 0, -10.0);
        let result = classify_with_reason(&wild);
        assert_eq!(result.metrics.score, 0.0);
        assert_eq!(result.metrics.trend, -100.0);
        assert_eq!(result.metrics.duration, 0.0);
        // score 0, trend -100, velocity -3 > -5
        assert_eq!(result.severity, Severity::High);
    }

    #[test]
    fn test_velocity_not_clamped() {
        let result = classify_with_reason(&metrics(20.0, -15.0, -450.0, 0, 1.0));
        assert_eq!(result.metrics.velocity, -450.0);
        assert_eq!(result.severity, Severity::Critical);
    }

    #[test]
    fn test_custom_tree() {
        let tree = DecisionTree::new(
            "score-only",
            DecisionNode::split(
                Feature::Score,
                50.0,
                DecisionNode::leaf(Severity::High),
                DecisionNode::leaf(Severity::Low),
            ),
        );
        let classifier = SeverityClassifier::new(Arc::new(tree));
        assert_eq!(classifier.classify(&metrics(10.0, 0.0, 0.0, 0, 0.0)), Severity::High);
        assert_eq!(classifier.tree().name, "score-only");
    }

    #[test]
    fn test_batch_matches_single() {
        let items = vec![
            ("a", metrics(20.0, -15.0, -6.0, 3, 2.0)),
            ("b", metrics(70.0, 2.0, 0.5, 1, 3.0)),
        ];
        let classifier = SeverityClassifier::default();
        let batch = classifier.classify_batch(&items);
        assert_eq!(batch.len(), 2);
        for ((key, input), (batch_key, result)) in items.iter().zip(&batch) {
            assert_eq!(key, batch_key);
            assert_eq!(result, &classify_with_reason(input));
        }
    }
}
