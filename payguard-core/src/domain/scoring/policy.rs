// payguard-core/src/domain/scoring/policy.rs
//
// Every weight, cap and penalty used by the scorers. Defaults are the
// calibrated payment-data policy; deployments override any part from YAML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use super::criticality::CriticalityRules;
use crate::domain::check::{Dimension, Severity};

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Default)]
pub struct ScoringPolicy {
    #[validate(nested)]
    #[serde(default)]
    pub severity_weights: SeverityWeights,

    #[validate(nested)]
    #[serde(default)]
    pub dimension_weights: DimensionWeights,

    #[validate(nested)]
    #[serde(default)]
    pub criticality: CriticalityRules,

    #[validate(nested)]
    #[serde(default)]
    pub error_rates: ErrorRateFields,

    #[validate(nested)]
    #[serde(default)]
    pub dimension: DimensionPolicy,

    #[validate(nested)]
    #[serde(default)]
    pub composite: CompositePolicy,
}

// --- SEVERITY ---

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct SeverityWeights {
    #[validate(range(exclusive_min = 0.0))]
    pub critical: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub high: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub medium: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub low: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 4.0,
            high: 3.0,
            medium: 2.0,
            low: 1.0,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

// --- DIMENSION WEIGHTS ---

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct DimensionWeights {
    #[validate(custom(function = "validate_positive_weights"))]
    pub base: BTreeMap<Dimension, f64>,
    /// Weight of any dimension absent from `base`.
    #[validate(range(exclusive_min = 0.0))]
    pub default: f64,
    /// Weight given to a dimension that had no checks.
    #[validate(range(exclusive_min = 0.0))]
    pub vacuous: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        let base = BTreeMap::from([
            (Dimension::Completeness, 2.0),
            (Dimension::Uniqueness, 3.0),
            (Dimension::Validity, 2.5),
            (Dimension::Consistency, 2.5),
            (Dimension::Timeliness, 2.0),
            (Dimension::Integrity, 2.5),
            (Dimension::Reconciliation, 3.0),
        ]);
        Self {
            base,
            default: 2.0,
            vacuous: 1.0,
        }
    }
}

impl DimensionWeights {
    pub fn base_for(&self, dimension: Dimension) -> f64 {
        self.base.get(&dimension).copied().unwrap_or(self.default)
    }
}

fn validate_positive_weights(weights: &BTreeMap<Dimension, f64>) -> Result<(), ValidationError> {
    if weights.values().all(|w| *w > 0.0) {
        Ok(())
    } else {
        Err(ValidationError::new("non_positive_weight"))
    }
}

// --- ERROR RATE EXTRACTION ---

/// Metric names read when turning a check into an error rate.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct ErrorRateFields {
    /// Fields holding an error rate directly, by priority.
    pub direct: Vec<String>,
    /// Fields holding a success rate (error = 1 - value), by priority.
    pub inverted: Vec<String>,
    /// Error rate assumed for a failed check carrying no usable field.
    #[validate(range(min = 0.0, max = 1.0))]
    pub failed_fallback: f64,
    /// Fields copied into the explainability trace.
    pub key_metrics: Vec<String>,
}

impl Default for ErrorRateFields {
    fn default() -> Self {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            direct: names(&[
                "overall_null_rate",
                "overall_duplicate_rate",
                "overall_invalid_rate",
                "inconsistent_rate",
                "violation_rate",
                "excessive_delay_rate",
            ]),
            inverted: names(&["match_rate", "overall_reconciliation_rate"]),
            failed_fallback: 0.05,
            key_metrics: names(&[
                "overall_null_rate",
                "overall_duplicate_rate",
                "overall_invalid_rate",
                "inconsistent_rate",
                "violation_rate",
                "match_rate",
                "overall_reconciliation_rate",
                "missing_count",
                "duplicate_count",
                "invalid_count",
                "inconsistent_count",
                "violation_count",
                "unmatched_count",
            ]),
        }
    }
}

// --- DIMENSION SCORE ---

/// Ceiling applied when at least `min_critical_failures` critical checks
/// failed and the worst failing error rate exceeds `error_above`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct CriticalFailureCap {
    #[validate(range(min = 1))]
    pub min_critical_failures: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub error_above: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub cap: f64,
}

/// Multiplier applied when the fraction of failed checks exceeds `ratio_above`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct FailRatioPenalty {
    #[validate(range(min = 0.0, max = 1.0))]
    pub ratio_above: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub factor: f64,
}

/// Tiers are evaluated in order; the first one that matches wins.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct DimensionPolicy {
    /// Score of a dimension without checks.
    #[validate(range(min = 0.0, max = 100.0))]
    pub vacuous_score: f64,
    #[validate(nested)]
    pub critical_caps: Vec<CriticalFailureCap>,
    #[validate(nested)]
    pub fail_ratio_penalties: Vec<FailRatioPenalty>,
}

impl Default for DimensionPolicy {
    fn default() -> Self {
        Self {
            vacuous_score: 100.0,
            critical_caps: vec![
                CriticalFailureCap {
                    min_critical_failures: 3,
                    error_above: 0.5,
                    cap: 30.0,
                },
                CriticalFailureCap {
                    min_critical_failures: 2,
                    error_above: 0.3,
                    cap: 50.0,
                },
                CriticalFailureCap {
                    min_critical_failures: 1,
                    error_above: 0.2,
                    cap: 65.0,
                },
            ],
            fail_ratio_penalties: vec![
                FailRatioPenalty {
                    ratio_above: 0.5,
                    factor: 0.7,
                },
                FailRatioPenalty {
                    ratio_above: 0.3,
                    factor: 0.85,
                },
            ],
        }
    }
}

impl DimensionPolicy {
    pub fn cap_for(&self, critical_failures: usize, max_error: f64) -> Option<f64> {
        self.critical_caps
            .iter()
            .find(|c| critical_failures >= c.min_critical_failures && max_error > c.error_above)
            .map(|c| c.cap)
    }

    pub fn fail_ratio_factor(&self, fail_ratio: f64) -> Option<f64> {
        self.fail_ratio_penalties
            .iter()
            .find(|p| fail_ratio > p.ratio_above)
            .map(|p| p.factor)
    }
}

// --- COMPOSITE ---

/// Ceiling on the composite when the worst dimension scores below `min_below`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ScoreCeiling {
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_below: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub cap: f64,
}

/// Multiplier applied when at least `at_least` critical dimensions fail.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct CriticalDimensionPenalty {
    #[validate(range(min = 1))]
    pub at_least: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub factor: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct CompositePolicy {
    /// A dimension scoring below this is "problematic".
    #[validate(range(min = 0.0, max = 100.0))]
    pub problem_threshold: f64,
    #[validate(nested)]
    pub min_score_ceilings: Vec<ScoreCeiling>,

    #[validate(length(min = 1))]
    pub critical_dimensions: Vec<Dimension>,
    /// A critical dimension scoring below this counts as failing.
    #[validate(range(min = 0.0, max = 100.0))]
    pub critical_fail_below: f64,
    #[validate(nested)]
    pub critical_penalties: Vec<CriticalDimensionPenalty>,

    /// Below this minimum, the composite is pulled hard toward the minimum.
    #[validate(range(min = 0.0, max = 100.0))]
    pub heavy_blend_below: f64,
    /// Share of the minimum in the heavy blend.
    #[validate(range(min = 0.0, max = 1.0))]
    pub heavy_blend_min_share: f64,
    /// Below this minimum, with enough problematic dimensions, the composite
    /// is averaged with the minimum.
    #[validate(range(min = 0.0, max = 100.0))]
    pub even_blend_below: f64,
    #[validate(range(min = 1))]
    pub even_blend_min_count: usize,
}

impl Default for CompositePolicy {
    fn default() -> Self {
        Self {
            problem_threshold: 50.0,
            min_score_ceilings: vec![
                ScoreCeiling {
                    min_below: 20.0,
                    cap: 30.0,
                },
                ScoreCeiling {
                    min_below: 40.0,
                    cap: 45.0,
                },
                ScoreCeiling {
                    min_below: 50.0,
                    cap: 55.0,
                },
            ],
            critical_dimensions: vec![
                Dimension::Completeness,
                Dimension::Validity,
                Dimension::Uniqueness,
            ],
            critical_fail_below: 60.0,
            critical_penalties: vec![
                CriticalDimensionPenalty {
                    at_least: 3,
                    factor: 0.5,
                },
                CriticalDimensionPenalty {
                    at_least: 2,
                    factor: 0.65,
                },
                CriticalDimensionPenalty {
                    at_least: 1,
                    factor: 0.8,
                },
            ],
            heavy_blend_below: 30.0,
            heavy_blend_min_share: 0.7,
            even_blend_below: 50.0,
            even_blend_min_count: 2,
        }
    }
}

impl CompositePolicy {
    pub fn ceiling_for(&self, min_score: f64) -> Option<f64> {
        self.min_score_ceilings
            .iter()
            .find(|c| min_score < c.min_below)
            .map(|c| c.cap)
    }

    pub fn critical_penalty_for(&self, failing: usize) -> Option<f64> {
        self.critical_penalties
            .iter()
            .find(|p| failing >= p.at_least)
            .map(|p| p.factor)
    }

    pub fn is_critical(&self, dimension: Dimension) -> bool {
        self.critical_dimensions.contains(&dimension)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_tier_lookups() {
        let dim = DimensionPolicy::default();
        assert_eq!(dim.cap_for(3, 0.9), Some(30.0));
        assert_eq!(dim.cap_for(3, 0.4), Some(50.0));
        assert_eq!(dim.cap_for(1, 0.25), Some(65.0));
        assert_eq!(dim.cap_for(1, 0.2), None);
        assert_eq!(dim.cap_for(0, 0.9), None);
        assert_eq!(dim.fail_ratio_factor(0.6), Some(0.7));
        assert_eq!(dim.fail_ratio_factor(0.5), Some(0.85));
        assert_eq!(dim.fail_ratio_factor(0.3), None);

        let comp = CompositePolicy::default();
        assert_eq!(comp.ceiling_for(10.0), Some(30.0));
        assert_eq!(comp.ceiling_for(39.9), Some(45.0));
        assert_eq!(comp.ceiling_for(50.0), None);
        assert_eq!(comp.critical_penalty_for(4), Some(0.5));
        assert_eq!(comp.critical_penalty_for(0), None);
    }

    #[test]
    fn test_dimension_weight_lookup() {
        let w = DimensionWeights::default();
        assert_eq!(w.base_for(Dimension::Uniqueness), 3.0);
        assert_eq!(w.base_for(Dimension::Validity), 2.5);
        assert_eq!(w.base_for(Dimension::AnomalyDetection), 2.0);
        assert_eq!(w.base_for(Dimension::Unknown), 2.0);
    }

    #[test]
    fn test_partial_override_from_yaml() -> Result<()> {
        let yaml = r#"
severity_weights:
  critical: 10.0
composite:
  critical_dimensions: [completeness]
"#;
        let policy: ScoringPolicy = serde_yaml::from_str(yaml)?;
        assert_eq!(policy.severity_weights.critical, 10.0);
        assert_eq!(policy.severity_weights.low, 1.0);
        assert_eq!(policy.composite.critical_dimensions, vec![Dimension::Completeness]);
        assert_eq!(policy.composite.heavy_blend_below, 30.0);
        assert!(policy.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_invalid_factor_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.dimension.fail_ratio_penalties[0].factor = 1.5;
        assert!(policy.validate().is_err());
    }
}
