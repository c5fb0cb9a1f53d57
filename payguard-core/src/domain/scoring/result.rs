// payguard-core/src/domain/scoring/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::check::{Dimension, Metrics, Severity};

pub const SCORE_FORMULA: &str = "score = max(0, 100 * (1 - weighted_error_rate)) with caps";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityDistribution {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

impl FromIterator<Severity> for SeverityDistribution {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        let mut distribution = Self::default();
        for severity in iter {
            distribution.record(severity);
        }
        distribution
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailingCheck {
    pub check_id: String,
    pub severity: Severity,
    pub error_rate: f64,
}

/// Trace of how a dimension score was reached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Explainability {
    /// Set only for a dimension that had no checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub weighted_error_rate: f64,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub total_checks: usize,
    #[serde(default)]
    pub critical_failures: usize,
    #[serde(default)]
    pub high_failures: usize,
    #[serde(default)]
    pub failing_checks: Vec<FailingCheck>,
    /// Key metrics per check id.
    #[serde(default)]
    pub metrics: BTreeMap<String, Metrics>,
    #[serde(default)]
    pub impacted_columns: Vec<String>,
    #[serde(default)]
    pub severity_distribution: SeverityDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub weight: f64,
    pub explainability: Explainability,
}

impl DimensionScore {
    pub fn is_vacuous(&self) -> bool {
        self.explainability.total_checks == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub dimension_scores: BTreeMap<Dimension, DimensionScore>,
    pub dimension_weights: BTreeMap<Dimension, f64>,
    pub composite_dqs: f64,
    pub duration_ms: u64,
    pub scored_at: DateTime<Utc>,
}

impl ScoringResult {
    pub fn score(&self, dimension: Dimension) -> Option<f64> {
        self.dimension_scores.get(&dimension).map(|d| d.score)
    }
}

/// Rounds to `decimals` places, half away from zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
