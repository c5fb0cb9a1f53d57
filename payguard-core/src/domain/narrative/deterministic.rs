// payguard-core/src/domain/narrative/deterministic.rs

use std::collections::BTreeSet;

use super::{BusinessImpact, IssueSummary, Narrative, Narrator, QualityStatus, RiskLevel};
use crate::domain::check::{CheckResult, Dimension, Severity};
use crate::domain::dataset::Profile;
use crate::domain::scoring::ScoringResult;

const MAX_ISSUES: usize = 10;
const MAX_RECOMMENDATIONS: usize = 5;

const GOOD_FROM: f64 = 80.0;
const FAIR_FROM: f64 = 60.0;

/// Template-based narrator. Same inputs, same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicNarrator;

impl Narrator for DeterministicNarrator {
    fn name(&self) -> &'static str {
        "deterministic"
    }

    fn narrate(&self, scoring: &ScoringResult, checks: &[CheckResult], _profile: &Profile) -> Narrative {
        let score = scoring.composite_dqs;
        let failing: Vec<&CheckResult> = checks.iter().filter(|c| c.failed()).collect();
        let status = quality_status(score);

        Narrative {
            quality_status: status,
            summary: summary(status, score, &failing),
            issue_summaries: failing.iter().take(MAX_ISSUES).map(|c| issue(c)).collect(),
            recommendations: recommendations(&failing),
            business_impact: business_impact(score),
            generated_by: self.name().to_string(),
        }
    }
}

pub fn quality_status(score: f64) -> QualityStatus {
    if score >= GOOD_FROM {
        QualityStatus::Good
    } else if score >= FAIR_FROM {
        QualityStatus::Fair
    } else {
        QualityStatus::Poor
    }
}

fn summary(status: QualityStatus, score: f64, failing: &[&CheckResult]) -> String {
    let mut text = match status {
        QualityStatus::Good => format!("Data quality is good, with an overall score of {score:.1}/100."),
        QualityStatus::Fair => format!(
            "Data quality is fair, with an overall score of {score:.1}/100. Some fixes are advisable."
        ),
        QualityStatus::Poor => format!(
            "Data quality is poor, with an overall score of {score:.1}/100. Immediate action is needed."
        ),
    };

    if failing.is_empty() {
        text.push_str(" No significant issue was detected.");
        return text;
    }

    let critical = failing.iter().filter(|c| c.severity == Severity::Critical).count();
    let high = failing.iter().filter(|c| c.severity == Severity::High).count();
    if critical > 0 {
        text.push_str(&format!(
            " {critical} critical issue(s) may compromise payment processing."
        ));
    }
    if high > 0 {
        text.push_str(&format!(" {high} high-priority issue(s) need review."));
    }

    let dimensions: BTreeSet<Dimension> = failing.iter().map(|c| c.dimension).collect();
    let names: Vec<&str> = dimensions.iter().map(Dimension::as_str).collect();
    text.push_str(&format!(" Affected areas: {}.", names.join(", ")));
    text
}

fn issue(check: &CheckResult) -> IssueSummary {
    IssueSummary {
        check_id: check.check_id.clone(),
        severity: check.severity,
        dimension: check.dimension,
        description: describe(check),
        impact: severity_impact(check.severity).to_string(),
    }
}

fn describe(check: &CheckResult) -> String {
    let pct = |field: &str| check.metrics.number(field).map(|r| r * 100.0);

    match check.check_id.as_str() {
        "ml_numeric_anomalies" => {
            return "Statistical outliers found in numeric columns.".to_string();
        }
        "ml_categorical_anomalies" => {
            return "Rare category values found; possible typos or unmapped codes.".to_string();
        }
        "ml_text_anomalies" => {
            return "Text values with unusual lengths found.".to_string();
        }
        "ml_row_anomalies" => {
            return "Rows whose combination of numeric fields is atypical.".to_string();
        }
        _ => {}
    }

    let detail = match check.dimension {
        Dimension::Completeness => pct("overall_null_rate").map(|p| format!("Missing values: {p:.1}%")),
        Dimension::Validity => pct("overall_invalid_rate").map(|p| format!("Invalid values: {p:.1}%")),
        Dimension::Uniqueness => pct("overall_duplicate_rate").map(|p| format!("Duplicates: {p:.1}%")),
        Dimension::Consistency => pct("inconsistent_rate").map(|p| format!("Inconsistent records: {p:.1}%")),
        Dimension::Integrity => pct("violation_rate").map(|p| format!("Integrity violations: {p:.1}%")),
        Dimension::Timeliness => pct("excessive_delay_rate").map(|p| format!("Late records: {p:.1}%")),
        Dimension::Reconciliation => pct("match_rate").map(|p| format!("Matched records: {p:.1}%")),
        Dimension::AnomalyDetection | Dimension::Unknown => None,
    };

    match detail {
        Some(detail) => format!("{} check failed. {}", check.check_id, detail),
        None => format!("{} check failed.", check.check_id),
    }
}

fn severity_impact(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Can cause failed payments, compliance breaches or financial mismatches.",
        Severity::High => "Can delay transactions, skew reporting or affect customers.",
        Severity::Medium => "Can degrade analytics accuracy or operational efficiency.",
        Severity::Low => "Limited operational impact.",
    }
}

fn recommendation(dimension: Dimension) -> Option<&'static str> {
    let text = match dimension {
        Dimension::Completeness => "Enforce mandatory fields at ingestion so critical columns cannot arrive empty.",
        Dimension::Validity => "Validate currencies, countries and MCC codes against ISO reference data.",
        Dimension::Uniqueness => "Deduplicate batches on transaction id before loading.",
        Dimension::Consistency => "Reconcile related fields (amounts, statuses, timestamps) with cross-field rules.",
        Dimension::Timeliness => "Monitor pipeline latency and alert on stale partitions.",
        Dimension::Integrity => "Check referential links to merchants and customers before loading.",
        Dimension::Reconciliation => "Investigate unmatched records against the settlement source.",
        Dimension::AnomalyDetection => "Review detected anomalies for fraud patterns or data corruption.",
        Dimension::Unknown => return None,
    };
    Some(text)
}

/// One recommendation per failing dimension, in order of first failure.
fn recommendations(failing: &[&CheckResult]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out: Vec<String> = failing
        .iter()
        .filter(|c| seen.insert(c.dimension))
        .filter_map(|c| recommendation(c.dimension))
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect();
    if out.is_empty() {
        out.push("Keep monitoring quality metrics to catch regressions early.".to_string());
    }
    out
}

pub fn business_impact(score: f64) -> BusinessImpact {
    let (risk_level, payment, compliance) = if score >= 90.0 {
        (
            RiskLevel::Low,
            "Minimal risk to payment processing",
            "Meets data quality standards",
        )
    } else if score >= 70.0 {
        (
            RiskLevel::Medium,
            "Some transactions may need manual review",
            "Minor compliance gaps possible",
        )
    } else if score >= 50.0 {
        (
            RiskLevel::High,
            "Elevated risk of payment errors",
            "Significant compliance issues likely",
        )
    } else {
        (
            RiskLevel::Critical,
            "Payment processing failures likely",
            "Major compliance violations expected",
        )
    };

    BusinessImpact {
        risk_level,
        payment_processing_risk: payment.to_string(),
        compliance_risk: compliance.to_string(),
        score,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::check::Metrics;
    use crate::domain::scoring::ScoringEngine;

    fn failing(id: &str, dimension: Dimension, severity: Severity, metrics: Metrics) -> CheckResult {
        CheckResult::new(id, dimension)
            .with_passed(false)
            .with_severity(severity)
            .with_metrics(metrics)
    }

    #[test]
    fn test_clean_run_narrative() {
        let checks = [CheckResult::new("not_null", Dimension::Completeness)];
        let scoring = ScoringEngine::default().compute_scores(&checks, &Profile::default(), &Dimension::ALL);
        let narrative = DeterministicNarrator.narrate(&scoring, &checks, &Profile::default());

        assert_eq!(narrative.quality_status, QualityStatus::Good);
        assert!(narrative.summary.contains("No significant issue"));
        assert!(narrative.issue_summaries.is_empty());
        assert_eq!(narrative.recommendations.len(), 1);
        assert_eq!(narrative.business_impact.risk_level, RiskLevel::Low);
        assert_eq!(narrative.generated_by, "deterministic");
    }

    #[test]
    fn test_failing_checks_drive_issues_and_recommendations() {
        let checks = vec![
            failing("nulls", Dimension::Completeness, Severity::Critical, Metrics::new().with("overall_null_rate", 0.42)),
            failing("nulls_bis", Dimension::Completeness, Severity::High, Metrics::new()),
            failing("dups", Dimension::Uniqueness, Severity::High, Metrics::new().with("overall_duplicate_rate", 0.3)),
            failing("ml_row_anomalies", Dimension::AnomalyDetection, Severity::Medium, Metrics::new()),
        ];
        let scoring = ScoringEngine::default().compute_scores(&checks, &Profile::default(), &Dimension::ALL);
        let narrative = DeterministicNarrator.narrate(&scoring, &checks, &Profile::default());

        assert_eq!(narrative.issue_summaries.len(), 4);
        assert_eq!(narrative.issue_summaries[0].description, "nulls check failed. Missing values: 42.0%");
        assert!(narrative.issue_summaries[3].description.starts_with("Rows whose"));
        // one per dimension
        assert_eq!(narrative.recommendations.len(), 3);
        assert!(narrative.summary.contains("1 critical issue(s)"));
        assert!(narrative.summary.contains("2 high-priority issue(s)"));
        assert!(narrative.summary.contains("Affected areas: completeness, uniqueness, anomaly_detection."));
    }

    #[test]
    fn test_issue_and_recommendation_limits() {
        let checks: Vec<CheckResult> = (0..25)
            .map(|i| failing(&format!("c{i}"), Dimension::ALL[i % 8], Severity::Low, Metrics::new()))
            .collect();
        let scoring = ScoringEngine::default().compute_scores(&checks, &Profile::default(), &Dimension::ALL);
        let narrative = DeterministicNarrator.narrate(&scoring, &checks, &Profile::default());
        assert_eq!(narrative.issue_summaries.len(), 10);
        assert_eq!(narrative.recommendations.len(), 5);
    }

    #[test]
    fn test_status_and_risk_tiers() {
        assert_eq!(quality_status(80.0), QualityStatus::Good);
        assert_eq!(quality_status(79.99), QualityStatus::Fair);
        assert_eq!(quality_status(59.0), QualityStatus::Poor);
        assert_eq!(business_impact(90.0).risk_level, RiskLevel::Low);
        assert_eq!(business_impact(70.0).risk_level, RiskLevel::Medium);
        assert_eq!(business_impact(50.0).risk_level, RiskLevel::High);
        assert_eq!(business_impact(49.99).risk_level, RiskLevel::Critical);
    }
}
