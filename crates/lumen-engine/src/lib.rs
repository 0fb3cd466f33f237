//! Lumen Engine: orchestration over pluggable stores
//!
//! # Flow
//!
//! ```text
//! MetricSampleStore → TrendEstimator
//!                   → derive_metrics → SeverityClassifier → NotificationGate → payload
//! sources (per brand) → Auditor → SnapshotStore + ValidationHistory
//! ```
//!
//! Everything below the ports is synchronous and CPU bound. Stores are
//! injected as trait objects; the in-memory ones in [`ports`] suit tests.

pub mod audit_job;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod ports;
pub mod telemetry;

pub use audit_job::AuditJob;
pub use config::EngineConfig;
pub use engine::{Engine, Ports};
pub use pipeline::{AlertOutcome, AlertPipeline, AlertRequest, BatchSummary};
pub use ports::{
    EventStore, InMemoryEventStore, InMemoryNotificationLog, InMemorySampleStore, MetricSampleStore, NotificationLog,
};
pub use telemetry::init_tracing;
