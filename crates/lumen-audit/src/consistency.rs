//! Consistency index across providers
//!
//! Derived from how far the providers' confidence scores (0-100) spread
//! around their mean. 50 is the largest population standard deviation
//! possible on that scale, so the index runs from 100 (full agreement) to 0.

use lumen_core::stats::population_std_dev;
use std::collections::BTreeMap;

const MAX_STD_DEV: f64 = 50.0;

/// `None` with fewer than two providers
pub fn consistency_index(scores: &[f64]) -> Option<f64> {
    if scores.len() < 2 {
        return None;
    }
    let clamped: Vec<f64> = scores.iter().map(|s| lumen_core::clamp_score(*s)).collect();
    let sigma = population_std_dev(&clamped)?;
    Some((100.0 * (1.0 - sigma / MAX_STD_DEV)).clamp(0.0, 100.0))
}

/// Same as [`consistency_index`] over a provider → score map
pub fn consistency_index_by_provider(scores: &BTreeMap<String, f64>) -> Option<f64> {
    let values: Vec<f64> = scores.values().copied().collect();
    consistency_index(&values)
}
