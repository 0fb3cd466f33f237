//! Tracked metrics and the composite score formula
//!
//! Only metrics on this allow-list are reconciled. The composite score is a
//! fixed weighted sum of the five pillars:
//!
//! | pillar          | weight |
//! |-----------------|--------|
//! | visibility      | 0.20   |
//! | citation        | 0.15   |
//! | content_quality | 0.25   |
//! | technical       | 0.25   |
//! | sentiment       | 0.15   |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A sub-component of the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Visibility,
    Citation,
    ContentQuality,
    Technical,
    Sentiment,
}

impl Pillar {
    pub const ALL: [Pillar; 5] = [
        Pillar::Visibility,
        Pillar::Citation,
        Pillar::ContentQuality,
        Pillar::Technical,
        Pillar::Sentiment,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            Pillar::Visibility => 0.20,
            Pillar::Citation => 0.15,
            Pillar::ContentQuality => 0.25,
            Pillar::Technical => 0.25,
            Pillar::Sentiment => 0.15,
        }
    }

    pub fn metric(&self) -> AuditMetric {
        match self {
            Pillar::Visibility => AuditMetric::Visibility,
            Pillar::Citation => AuditMetric::Citation,
            Pillar::ContentQuality => AuditMetric::ContentQuality,
            Pillar::Technical => AuditMetric::Technical,
            Pillar::Sentiment => AuditMetric::Sentiment,
        }
    }
}

/// The reconciliation allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMetric {
    OverallScore,
    Visibility,
    Citation,
    ContentQuality,
    Technical,
    Sentiment,
    Ctr,
    ConversionRate,
    AvgPosition,
}

impl AuditMetric {
    pub const ALL: [AuditMetric; 9] = [
        AuditMetric::OverallScore,
        AuditMetric::Visibility,
        AuditMetric::Citation,
        AuditMetric::ContentQuality,
        AuditMetric::Technical,
        AuditMetric::Sentiment,
        AuditMetric::Ctr,
        AuditMetric::ConversionRate,
        AuditMetric::AvgPosition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditMetric::OverallScore => "overall_score",
            AuditMetric::Visibility => "visibility",
            AuditMetric::Citation => "citation",
            AuditMetric::ContentQuality => "content_quality",
            AuditMetric::Technical => "technical",
            AuditMetric::Sentiment => "sentiment",
            AuditMetric::Ctr => "ctr",
            AuditMetric::ConversionRate => "conversion_rate",
            AuditMetric::AvgPosition => "avg_position",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn pillar(&self) -> Option<Pillar> {
        Pillar::ALL.into_iter().find(|p| p.metric() == *self)
    }
}

impl fmt::Display for AuditMetric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric values as reported by one source
pub type MetricValues = BTreeMap<AuditMetric, f64>;

/// All sources for one audit, keyed by source name
pub type SourceSet = BTreeMap<String, MetricValues>;

/// The five pillar values of one source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarScores {
    pub visibility: f64,
    pub citation: f64,
    pub content_quality: f64,
    pub technical: f64,
    pub sentiment: f64,
}

impl PillarScores {
    /// `None` unless all five pillars are present and finite
    pub fn from_values(values: &MetricValues) -> Option<Self> {
        let pillar = |metric: AuditMetric| values.get(&metric).copied().filter(|v| v.is_finite());
        Some(Self {
            visibility: pillar(AuditMetric::Visibility)?,
            citation: pillar(AuditMetric::Citation)?,
            content_quality: pillar(AuditMetric::ContentQuality)?,
            technical: pillar(AuditMetric::Technical)?,
            sentiment: pillar(AuditMetric::Sentiment)?,
        })
    }

    pub fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::Visibility => self.visibility,
            Pillar::Citation => self.citation,
            Pillar::ContentQuality => self.content_quality,
            Pillar::Technical => self.technical,
            Pillar::Sentiment => self.sentiment,
        }
    }

    /// Weighted sum of the pillars
    pub fn composite(&self) -> f64 {
        Pillar::ALL.iter().map(|p| p.weight() * self.get(*p)).sum()
    }
}

/// Pillars a source did not report
pub fn missing_pillars(values: &MetricValues) -> Vec<Pillar> {
    Pillar::ALL
        .into_iter()
        .filter(|p| !values.contains_key(&p.metric()))
        .collect()
}

/// Metrics reported as NaN or infinity
pub fn non_finite_metrics(values: &MetricValues) -> Vec<AuditMetric> {
    values
        .iter()
        .filter(|(_, v)| !v.is_finite())
        .map(|(metric, _)| *metric)
        .collect()
}
