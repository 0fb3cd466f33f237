//! Severity policy as data
//!
//! The policy is a hand-authored binary decision tree. Every split sends the
//! metrics left when `value <= threshold` and right otherwise. Keeping it as
//! a data structure lets the policy be inspected, serialised and tested apart
//! from the traversal.

use crate::metrics::AlertMetrics;
use crate::severity::Severity;
use lumen_core::{LumenError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Score,
    Trend,
    Velocity,
    Frequency,
    Duration,
}

impl Feature {
    pub fn value_of(&self, metrics: &AlertMetrics) -> f64 {
        match self {
            Feature::Score => metrics.score,
            Feature::Trend => metrics.trend,
            Feature::Velocity => metrics.velocity,
            Feature::Frequency => f64::from(metrics.frequency),
            Feature::Duration => metrics.duration,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Feature::Score => write!(f, "score"),
            Feature::Trend => write!(f, "trend"),
            Feature::Velocity => write!(f, "velocity"),
            Feature::Frequency => write!(f, "frequency"),
            Feature::Duration => write!(f, "duration"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionNode {
    Leaf {
        severity: Severity,
    },
    Split {
        feature: Feature,
        threshold: f64,
        left: Box<DecisionNode>,
        right: Box<DecisionNode>,
    },
}

impl DecisionNode {
    pub fn leaf(severity: Severity) -> Self {
        DecisionNode::Leaf { severity }
    }

    pub fn split(feature: Feature, threshold: f64, left: DecisionNode, right: DecisionNode) -> Self {
        DecisionNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn depth(&self) -> usize {
        match self {
            DecisionNode::Leaf { .. } => 0,
            DecisionNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn collect_leaves(&self, out: &mut Vec<Severity>) {
        match self {
            DecisionNode::Leaf { severity } => out.push(*severity),
            DecisionNode::Split { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        match self {
            DecisionNode::Leaf { .. } => Ok(()),
            DecisionNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if !threshold.is_finite() {
                    return Err(format!("split on {} has a non-finite threshold", feature));
                }
                left.check()?;
                right.check()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// `value <= threshold`
    Left,
    Right,
}

/// One split taken during traversal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub feature: Feature,
    pub threshold: f64,
    pub observed: f64,
    pub branch: Branch,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self.branch {
            Branch::Left => "<=",
            Branch::Right => ">",
        };
        write!(f, "{} {} {} ({})", self.feature, op, self.threshold, self.observed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub name: String,
    pub root: DecisionNode,
}

/// The calibrated policy shared by every call site
pub static DEFAULT_TREE: Lazy<Arc<DecisionTree>> = Lazy::new(|| Arc::new(DecisionTree::calibrated()));

impl DecisionTree {
    pub fn new(name: impl Into<String>, root: DecisionNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// The production alert policy.
    ///
    /// ```text
    /// score <= 30
    /// ├─ trend <= -10
    /// │  ├─ velocity <= -5 → critical
    /// │  └─ else           → high
    /// └─ else frequency <= 5 → medium, else high
    /// score <= 60
    /// ├─ trend <= -15
    /// │  ├─ velocity <= -8 → high
    /// │  └─ else           → medium
    /// └─ else frequency <= 10 → low, else medium
    /// score > 60
    /// ├─ trend <= -20
    /// │  ├─ frequency <= 7 → medium
    /// │  └─ else           → high
    /// └─ else duration <= 7 → low, else medium
    /// ```
    pub fn calibrated() -> Self {
        use DecisionNode as N;
        use Feature::*;
        use Severity::*;

        let low_score = N::split(
            Trend,
            -10.0,
            N::split(Velocity, -5.0, N::leaf(Critical), N::leaf(High)),
            N::split(Frequency, 5.0, N::leaf(Medium), N::leaf(High)),
        );
        let mid_score = N::split(
            Trend,
            -15.0,
            N::split(Velocity, -8.0, N::leaf(High), N::leaf(Medium)),
            N::split(Frequency, 10.0, N::leaf(Low), N::leaf(Medium)),
        );
        let high_score = N::split(
            Trend,
            -20.0,
            N::split(Frequency, 7.0, N::leaf(Medium), N::leaf(High)),
            N::split(Duration, 7.0, N::leaf(Low), N::leaf(Medium)),
        );

        Self::new(
            "alert-severity@1.0",
            N::split(Score, 30.0, low_score, N::split(Score, 60.0, mid_score, high_score)),
        )
    }

    /// Load a policy from YAML and reject non-finite thresholds
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let tree: DecisionTree =
            serde_yaml::from_str(yaml).map_err(|e| LumenError::Config(e.to_string()))?;
        tree.root.check().map_err(LumenError::Config)?;
        Ok(tree)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| LumenError::Config(e.to_string()))
    }

    /// Walk the tree; returns the leaf severity and every split taken
    pub fn traverse(&self, metrics: &AlertMetrics) -> (Severity, Vec<Decision>) {
        let mut path = Vec::new();
        let mut node = &self.root;
        loop {
            match node {
                DecisionNode::Leaf { severity } => return (*severity, path),
                DecisionNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let observed = feature.value_of(metrics);
                    let branch = if observed <= *threshold {
                        Branch::Left
                    } else {
                        Branch::Right
                    };
                    path.push(Decision {
                        feature: *feature,
                        threshold: *threshold,
                        observed,
                        branch,
                    });
                    node = match branch {
                        Branch::Left => left,
                        Branch::Right => right,
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Leaf severities, left to right
    pub fn leaves(&self) -> Vec<Severity> {
        let mut out = Vec::new();
        self.root.collect_leaves(&mut out);
        out
    }
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::calibrated()
    }
}
