//! Lumen Alerts: severity classification and notification gating
//!
//! # Architecture
//!
//! ```text
//! samples + events → derive_metrics → AlertMetrics
//!                                          ↓
//!                              SeverityClassifier (DecisionTree)
//!                                          ↓
//!                              Classification { severity, reason }
//!                                          ↓
//!                              NotificationGate → NotificationPayload
//! ```
//!
//! # Example
//!
//! ```
//! use lumen_alerts::{classify_with_reason, AlertMetrics, Severity};
//!
//! let metrics = AlertMetrics::new(20.0)
//!     .with_trend(-15.0)
//!     .with_velocity(-6.0)
//!     .with_frequency(3)
//!     .with_duration(2.0);
//!
//! let result = classify_with_reason(&metrics);
//! assert_eq!(result.severity, Severity::Critical);
//! println!("{}", result.reason);
//! ```

pub mod classifier;
pub mod config;
pub mod features;
pub mod gate;
pub mod metrics;
pub mod notification;
pub mod rationale;
pub mod severity;
pub mod tree;

pub use classifier::{classify, classify_with_reason, Classification, SeverityClassifier};
pub use config::{AlertConfig, GateConfig};
pub use features::derive_metrics;
pub use gate::{GateDecision, NotificationGate, NotificationRecord};
pub use metrics::AlertMetrics;
pub use notification::{sort_by_priority, NotificationPayload};
pub use severity::Severity;
pub use tree::{Branch, Decision, DecisionNode, DecisionTree, Feature, DEFAULT_TREE};
