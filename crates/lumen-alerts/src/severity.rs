//! Severity tiers
//!
//! Totally ordered: `Critical > High > Medium > Low`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Healthy, keep monitoring
    #[default]
    Low = 0,
    /// Moderate decline or frequent occurrences
    Medium = 1,
    /// At risk, declining quickly
    High = 2,
    /// Critical score with fast decline
    Critical = 3,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Sort key for outbound queues: critical=4 down to low=1
    pub fn priority_rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    pub fn from_priority_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Severity::Low),
            2 => Some(Severity::Medium),
            3 => Some(Severity::High),
            4 => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Whether this tier bypasses notification rate limits
    pub fn always_notifies(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        let mut tiers = vec![Severity::High, Severity::Low, Severity::Critical, Severity::Medium];
        tiers.sort();
        assert_eq!(tiers, Severity::ALL.to_vec());
    }

    #[test]
    fn test_priority_rank_roundtrip() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_priority_rank(severity.priority_rank()), Some(severity));
        }
        assert_eq!(Severity::Critical.priority_rank(), 4);
        assert_eq!(Severity::Low.priority_rank(), 1);
        assert_eq!(Severity::from_priority_rank(0), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
    }
}
