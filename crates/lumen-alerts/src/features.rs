//! Feature derivation
//!
//! Turns raw samples and event history into the [`AlertMetrics`] vector the
//! classifier consumes.

use crate::config::{AlertConfig, MAX_WINDOW_DAYS};
use crate::metrics::AlertMetrics;
use chrono::{DateTime, Duration, Utc};
use lumen_core::data_model::days_between;
use lumen_core::{AlertEvent, LumenError, MetricSample, Result};

/// `current - previous` over the two most recent samples, and that change per
/// day with the day count floored at 1
pub fn trend_and_velocity(samples: &[MetricSample]) -> Result<(f64, f64)> {
    let mut ordered: Vec<&MetricSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);
    let [.., previous, current] = ordered.as_slice() else {
        return Err(LumenError::insufficient(2, samples.len()));
    };

    let trend = current.value - previous.value;
    let days = days_between(previous.timestamp, current.timestamp).max(1.0);
    Ok((trend, trend / days))
}

/// Events of `category` within the trailing window ending at `now`.
///
/// The window is capped at `MAX_WINDOW_DAYS`.
pub fn frequency(events: &[AlertEvent], category: &str, now: DateTime<Utc>, window_days: i64) -> u32 {
    let start = now
        .checked_sub_signed(Duration::days(window_days.clamp(0, MAX_WINDOW_DAYS)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let count = events
        .iter()
        .filter(|e| e.category == category && e.occurred_at > start && e.occurred_at <= now)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Days since the first event of the current streak, floored at 1.
///
/// The streak is the run of `category` events ending at the most recent one
/// (not after `now`) in which consecutive events are at most `gap_days` apart.
pub fn streak_duration(events: &[AlertEvent], category: &str, now: DateTime<Utc>, gap_days: i64) -> f64 {
    let mut times: Vec<DateTime<Utc>> = events
        .iter()
        .filter(|e| e.category == category && e.occurred_at <= now)
        .map(|e| e.occurred_at)
        .collect();
    times.sort();

    let Some(mut earliest) = times.last().copied() else {
        return 1.0;
    };
    let gap = Duration::days(gap_days.clamp(0, MAX_WINDOW_DAYS));
    for t in times.iter().rev().skip(1) {
        if earliest - *t > gap {
            break;
        }
        earliest = *t;
    }
    days_between(earliest, now).max(1.0)
}

/// Build the full feature vector for one brand and alert category
pub fn derive_metrics(
    samples: &[MetricSample],
    events: &[AlertEvent],
    category: &str,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Result<AlertMetrics> {
    let (trend, velocity) = trend_and_velocity(samples)?;
    let score = samples
        .iter()
        .max_by_key(|s| s.timestamp)
        .map(|s| s.value)
        .unwrap_or_default();

    Ok(AlertMetrics {
        score,
        trend,
        frequency: frequency(events, category, now, config.frequency_window_days),
        velocity,
        duration: streak_duration(events, category, now, config.streak_gap_days),
    })
}
