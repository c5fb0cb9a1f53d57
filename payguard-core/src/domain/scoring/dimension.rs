// payguard-core/src/domain/scoring/dimension.rs

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::policy::ScoringPolicy;
use super::result::{
    DimensionScore, Explainability, FailingCheck, SCORE_FORMULA, SeverityDistribution, round_to,
};
use crate::domain::check::{CheckResult, Dimension, Metrics, Severity};
use crate::domain::dataset::Profile;

const VACUOUS_MESSAGE: &str = "No checks executed for this dimension";

/// Reduces the checks of one dimension to a score, a weight and a trace.
#[derive(Debug, Clone, Copy)]
pub struct DimensionScorer<'p> {
    policy: &'p ScoringPolicy,
}

impl<'p> DimensionScorer<'p> {
    pub fn new(policy: &'p ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn score<'c>(
        &self,
        dimension: Dimension,
        checks: impl IntoIterator<Item = &'c CheckResult>,
        profile: &Profile,
    ) -> DimensionScore {
        let checks: Vec<&CheckResult> = checks.into_iter().collect();

        if checks.is_empty() {
            return DimensionScore {
                dimension,
                score: self.policy.dimension.vacuous_score,
                weight: self.policy.dimension_weights.vacuous,
                explainability: Explainability {
                    message: Some(VACUOUS_MESSAGE.to_string()),
                    ..Default::default()
                },
            };
        }

        let mut total_error_weight = 0.0;
        let mut total_weight = 0.0;
        let mut failing_checks = Vec::new();
        let mut critical_failures = 0;
        let mut high_failures = 0;
        let mut key_metrics = BTreeMap::new();
        let mut impacted_columns = BTreeSet::new();

        for check in &checks {
            let weight = self.policy.severity_weights.weight(check.severity);
            let error_rate = self.error_rate(check);
            total_error_weight += error_rate * weight;
            total_weight += weight;

            if check.failed() {
                match check.severity {
                    Severity::Critical => critical_failures += 1,
                    Severity::High => high_failures += 1,
                    _ => {}
                }
                failing_checks.push(FailingCheck {
                    check_id: check.check_id.clone(),
                    severity: check.severity,
                    error_rate,
                });
            }

            impacted_columns.extend(check.metrics.failing_columns().map(str::to_string));
            key_metrics.insert(check.check_id.clone(), self.key_metrics(check));
        }

        let weighted_error_rate = if total_weight > 0.0 {
            total_error_weight / total_weight
        } else {
            0.0
        };
        let mut score = (100.0 * (1.0 - weighted_error_rate)).max(0.0);

        if !failing_checks.is_empty() {
            let max_error = failing_checks
                .iter()
                .map(|f| f.error_rate)
                .fold(0.0, f64::max);
            if let Some(cap) = self.policy.dimension.cap_for(critical_failures, max_error) {
                score = score.min(cap);
            }

            let fail_ratio = failing_checks.len() as f64 / checks.len() as f64;
            if let Some(factor) = self.policy.dimension.fail_ratio_factor(fail_ratio) {
                score *= factor;
            }
        }

        let score = round_to(score.clamp(0.0, 100.0), 2);
        let weight = self.weight(dimension, profile);

        debug!(
            dimension = %dimension,
            score,
            weight,
            weighted_error_rate,
            failing = failing_checks.len(),
            "Dimension scored"
        );

        DimensionScore {
            dimension,
            score,
            weight,
            explainability: Explainability {
                message: None,
                weighted_error_rate: round_to(weighted_error_rate, 4),
                formula: SCORE_FORMULA.to_string(),
                total_checks: checks.len(),
                critical_failures,
                high_failures,
                failing_checks,
                metrics: key_metrics,
                impacted_columns: impacted_columns.into_iter().collect(),
                severity_distribution: checks.iter().map(|c| c.severity).collect::<SeverityDistribution>(),
            },
        }
    }

    /// Error rate in [0, 1]: first direct rate field present, else first
    /// inverted success rate, else the fallback for failed checks.
    pub fn error_rate(&self, check: &CheckResult) -> f64 {
        let fields = &self.policy.error_rates;
        let rate = fields
            .direct
            .iter()
            .find_map(|f| check.metrics.number(f))
            .or_else(|| {
                fields
                    .inverted
                    .iter()
                    .find_map(|f| check.metrics.number(f))
                    .map(|r| 1.0 - r)
            })
            .unwrap_or(if check.failed() {
                fields.failed_fallback
            } else {
                0.0
            });
        if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) }
    }

    /// Dimension importance, boosted for datasets rich in critical fields.
    pub fn weight(&self, dimension: Dimension, profile: &Profile) -> f64 {
        let base = self.policy.dimension_weights.base_for(dimension);
        round_to(base * self.policy.criticality.boost(profile.column_names()), 2)
    }

    fn key_metrics(&self, check: &CheckResult) -> Metrics {
        self.policy
            .error_rates
            .key_metrics
            .iter()
            .filter_map(|f| check.metrics.get(f).map(|v| (f.clone(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::ColumnProfile;
    use serde_json::json;

    fn check(id: &str, passed: bool, severity: Severity, metrics: Metrics) -> CheckResult {
        CheckResult::new(id, Dimension::Completeness)
            .with_passed(passed)
            .with_severity(severity)
            .with_metrics(metrics)
    }

    fn profile_with(columns: &[&str]) -> Profile {
        Profile {
            columns: columns
                .iter()
                .map(|c| (c.to_string(), ColumnProfile::default()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_vacuous_dimension() {
        let policy = ScoringPolicy::default();
        let scorer = DimensionScorer::new(&policy);
        let score = scorer.score(Dimension::Timeliness, std::iter::empty(), &Profile::default());

        assert_eq!(score.score, 100.0);
        assert_eq!(score.weight, 1.0);
        assert!(score.is_vacuous());
        assert_eq!(score.explainability.message.as_deref(), Some(VACUOUS_MESSAGE));
    }

    #[test]
    fn test_passing_check_without_rates_scores_full() {
        let policy = ScoringPolicy::default();
        let checks = [check("c1", true, Severity::Medium, Metrics::new())];
        let score = DimensionScorer::new(&policy).score(
            Dimension::Completeness,
            &checks,
            &Profile::default(),
        );
        assert_eq!(score.score, 100.0);
        assert_eq!(score.weight, 2.0);
        assert!(score.explainability.failing_checks.is_empty());
    }

    #[test]
    fn test_critical_null_rate_is_capped_and_penalized() {
        let policy = ScoringPolicy::default();
        let checks = [check(
            "null_check",
            false,
            Severity::Critical,
            Metrics::new().with("overall_null_rate", 0.9),
        )];
        let score = DimensionScorer::new(&policy).score(
            Dimension::Completeness,
            &checks,
            &Profile::default(),
        );

        // base 10, under the 65 cap, then x0.7 for a 100% fail ratio
        assert_eq!(score.score, 7.0);
        assert!(score.score <= 30.0);
        let ex = &score.explainability;
        assert_eq!(ex.weighted_error_rate, 0.9);
        assert_eq!(ex.critical_failures, 1);
        assert_eq!(ex.failing_checks[0].error_rate, 0.9);
        assert_eq!(ex.severity_distribution.critical, 1);
    }

    #[test]
    fn test_three_critical_failures_cap_at_thirty() {
        let policy = ScoringPolicy::default();
        let mut checks: Vec<CheckResult> = (0..3)
            .map(|i| {
                check(
                    &format!("crit_{i}"),
                    false,
                    Severity::Critical,
                    Metrics::new().with("overall_invalid_rate", if i == 0 { 0.6 } else { 0.01 }),
                )
            })
            .collect();
        // Plenty of clean passing checks keep the base score high
        checks.extend((0..20).map(|i| check(&format!("ok_{i}"), true, Severity::Low, Metrics::new())));

        let score = DimensionScorer::new(&policy).score(
            Dimension::Validity,
            &checks,
            &Profile::default(),
        );
        assert!(score.score <= 30.0);
        assert_eq!(score.score, 30.0);
    }

    #[test]
    fn test_error_rate_sources() {
        let policy = ScoringPolicy::default();
        let scorer = DimensionScorer::new(&policy);

        let direct = check("a", true, Severity::Low, Metrics::new().with("violation_rate", 0.2));
        assert_eq!(scorer.error_rate(&direct), 0.2);

        let inverted = check("b", false, Severity::Low, Metrics::new().with("match_rate", 0.75));
        assert_eq!(scorer.error_rate(&inverted), 0.25);

        let stringly = check("c", true, Severity::Low, Metrics::new().with("overall_null_rate", "0.5"));
        assert_eq!(scorer.error_rate(&stringly), 0.5);

        let failed_silent = check("d", false, Severity::Low, Metrics::new());
        assert_eq!(scorer.error_rate(&failed_silent), 0.05);

        let out_of_range = check("e", true, Severity::Low, Metrics::new().with("inconsistent_rate", 3.0));
        assert_eq!(scorer.error_rate(&out_of_range), 1.0);
    }

    #[test]
    fn test_fail_ratio_penalty() {
        let policy = ScoringPolicy::default();
        // 2 of 5 failed with the 5% fallback: error = 2 * 0.05 * 2 / 10 = 0.02
        let mut checks = vec![
            check("f1", false, Severity::Medium, Metrics::new()),
            check("f2", false, Severity::Medium, Metrics::new()),
        ];
        checks.extend((0..3).map(|i| check(&format!("p{i}"), true, Severity::Medium, Metrics::new())));

        let score = DimensionScorer::new(&policy).score(
            Dimension::Consistency,
            &checks,
            &Profile::default(),
        );
        assert_eq!(score.score, round_to(98.0 * 0.85, 2));
    }

    #[test]
    fn test_explainability_collects_columns_and_key_metrics() {
        let policy = ScoringPolicy::default();
        let metrics = Metrics::new()
            .with("overall_null_rate", 0.1)
            .with("missing_count", 12)
            .with("sample_rows", json!([1, 2, 3]))
            .with(
                "failing_columns",
                json!([{"column": "amount", "null_rate": 0.2}, "currency", {"column": "amount"}]),
            );
        let checks = [check("nulls", false, Severity::High, metrics)];

        let score = DimensionScorer::new(&policy).score(
            Dimension::Completeness,
            &checks,
            &Profile::default(),
        );
        let ex = &score.explainability;
        assert_eq!(ex.impacted_columns, vec!["amount", "currency"]);
        assert_eq!(ex.high_failures, 1);
        assert_eq!(ex.formula, SCORE_FORMULA);

        let key = &ex.metrics["nulls"];
        assert_eq!(key.len(), 2);
        assert!(key.get("missing_count").is_some());
        assert!(key.get("sample_rows").is_none());
    }

    #[test]
    fn test_weight_boosted_by_critical_fields() {
        let policy = ScoringPolicy::default();
        let scorer = DimensionScorer::new(&policy);
        let payments = profile_with(&["txn_id", "amount", "currency", "merchant_id", "status"]);

        assert_eq!(scorer.weight(Dimension::Uniqueness, &payments), 3.6);
        assert_eq!(scorer.weight(Dimension::Completeness, &payments), 2.4);
        assert_eq!(scorer.weight(Dimension::Validity, &payments), 3.0);
        assert_eq!(scorer.weight(Dimension::Uniqueness, &profile_with(&["notes"])), 3.0);
    }

    #[test]
    fn test_monotonic_in_error_rate() {
        let policy = ScoringPolicy::default();
        let scorer = DimensionScorer::new(&policy);
        let mut previous = f64::INFINITY;
        for step in 0..=20 {
            let rate = step as f64 / 20.0;
            let checks = [
                check("x", false, Severity::Critical, Metrics::new().with("overall_duplicate_rate", rate)),
                check("y", true, Severity::Medium, Metrics::new()),
            ];
            let s = scorer.score(Dimension::Uniqueness, &checks, &Profile::default()).score;
            assert!(s <= previous, "score rose from {previous} to {s} at rate {rate}");
            assert!((0.0..=100.0).contains(&s));
            previous = s;
        }
    }
}
