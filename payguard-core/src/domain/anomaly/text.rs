// payguard-core/src/domain/anomaly/text.rs

use tracing::{debug, instrument};

use super::columns::text_columns;
use super::config::AnomalyConfig;
use super::findings::{DetectorOutput, METHOD_LENGTH, TextAnomaly};
use crate::domain::check::{CheckResult, Dimension, Metrics, Severity};
use crate::domain::dataset::{Dataset, Profile};

pub const CHECK_ID: &str = "ml_text_anomalies";

/// Flags strings whose length sits more than `text_sigma` sample standard
/// deviations away from the column mean. Informational only.
#[instrument(skip_all, fields(detector = "text"))]
pub fn detect(
    dataset: &Dataset,
    profile: &Profile,
    config: &AnomalyConfig,
) -> DetectorOutput<TextAnomaly> {
    let mut findings = Vec::new();

    for column in text_columns(dataset, profile) {
        let values = column.string_values().unwrap_or_default();
        if values.len() < config.min_column_values {
            continue;
        }

        let lengths: Vec<f64> = values.iter().map(|v| v.chars().count() as f64).collect();
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let std = (lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        if std <= 0.0 {
            continue;
        }

        let limit = config.text_sigma * std;
        let unusual: Vec<&str> = values
            .iter()
            .zip(&lengths)
            .filter(|(_, len)| (**len - mean).abs() > limit)
            .map(|(v, _)| *v)
            .collect();
        if unusual.is_empty() {
            continue;
        }

        debug!(column = %column.name, unusual = unusual.len(), mean, std, "Unusual text lengths");
        findings.push(TextAnomaly {
            column: column.name.clone(),
            unusual_length_count: unusual.len(),
            mean_length: mean,
            std_length: std,
            sample_values: unusual
                .iter()
                .take(config.sample_limit)
                .map(|v| v.to_string())
                .collect(),
            method: METHOD_LENGTH.to_string(),
        });
    }

    if findings.is_empty() {
        return DetectorOutput::empty();
    }

    let metrics = Metrics::new()
        .with("columns_with_anomalies", findings.len())
        .with("method", METHOD_LENGTH);

    let check = CheckResult::new(CHECK_ID, Dimension::AnomalyDetection)
        .with_passed(true)
        .with_severity(Severity::Low)
        .with_metrics(metrics);

    DetectorOutput {
        findings,
        check: Some(check),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, ColumnProfile};
    use anyhow::Result;

    fn merchant_names() -> Vec<Option<String>> {
        let mut v: Vec<Option<String>> = (0..40)
            .map(|i| Some(if i % 2 == 0 { "ACME SHOP" } else { "CORNER CAFE" }.to_string()))
            .collect();
        v.push(Some("X".repeat(400)));
        v
    }

    #[test]
    fn test_extreme_length_flagged() -> Result<()> {
        let ds = Dataset::new(vec![Column::text("merchant_name", merchant_names())])?;
        let out = detect(&ds, &Profile::default(), &AnomalyConfig::default());

        assert_eq!(out.findings.len(), 1);
        let f = &out.findings[0];
        assert_eq!(f.unusual_length_count, 1);
        assert_eq!(f.sample_values[0].len(), 400);
        assert_eq!(f.method, METHOD_LENGTH);

        let check = out.check.unwrap();
        assert!(check.passed);
        assert_eq!(check.severity, Severity::Low);
        Ok(())
    }

    #[test]
    fn test_constant_length_is_skipped() -> Result<()> {
        let ds = Dataset::new(vec![Column::text(
            "currency",
            vec![Some("EUR".to_string()); 30],
        )])?;
        let out = detect(&ds, &Profile::default(), &AnomalyConfig::default());
        assert!(out.check.is_none());
        Ok(())
    }

    #[test]
    fn test_column_profiled_as_categorical_is_ignored() -> Result<()> {
        let ds = Dataset::new(vec![Column::text("merchant_name", merchant_names())])?;
        let mut profile = Profile::default();
        profile.columns.insert(
            "merchant_name".into(),
            ColumnProfile {
                inferred_type: Some("categorical".into()),
                null_count: None,
            },
        );
        let out = detect(&ds, &profile, &AnomalyConfig::default());
        assert!(out.findings.is_empty());
        Ok(())
    }
}
