//! Content fingerprints for cache keys and audit deduplication
//!
//! Values are fed field by field into a blake3 hasher. Strings are length
//! prefixed so `("ab", "c")` and `("a", "bc")` never collide.

use crate::data_model::MetricSample;

pub struct Fingerprint {
    hasher: blake3::Hasher,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn push_str(mut self, value: &str) -> Self {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn push_f64(mut self, value: f64) -> Self {
        self.hasher.update(&value.to_bits().to_le_bytes());
        self
    }

    pub fn push_i64(mut self, value: i64) -> Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn push_samples(self, samples: &[MetricSample]) -> Self {
        samples.iter().fold(self.push_i64(samples.len() as i64), |fp, s| {
            fp.push_i64(s.timestamp.timestamp_micros()).push_f64(s.value)
        })
    }

    pub fn finish(self) -> String {
        format!("blake3:{}", self.hasher.finalize())
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint of a sample series
pub fn of_samples(samples: &[MetricSample]) -> String {
    Fingerprint::new().push_samples(samples).finish()
}
