//! Lumen Core: shared data model for the observability engine
//!
//! Everything the trend, alert and audit crates agree on lives here:
//! samples and events, the unified error, the clock seam and the
//! bounded-TTL cache that replaces ad hoc module-level memoisation.

pub mod cache;
pub mod clock;
pub mod data_model;
pub mod error;
pub mod fingerprint;
pub mod stats;

pub use cache::{CacheConfig, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use data_model::{AlertEvent, MetricSample, YearMonth};
pub use error::{LumenError, Result};
pub use fingerprint::Fingerprint;

/// Engine version stamped into audit records
pub const LUMEN_VERSION: &str = "1.0.0";

/// Lower bound of the score scale
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of the score scale
pub const SCORE_MAX: f64 = 100.0;

/// Clamp a value onto the 0-100 score scale.
///
/// Non-finite input collapses to the nearest meaningful bound: `NaN` to 0,
/// infinities to their signed end of the scale.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        SCORE_MIN
    } else {
        value.clamp(SCORE_MIN, SCORE_MAX)
    }
}
