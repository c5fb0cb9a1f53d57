// payguard-core/src/domain/anomaly/categorical.rs

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::columns::categorical_columns;
use super::config::AnomalyConfig;
use super::findings::{CategoricalAnomaly, DetectorOutput, METHOD_FREQUENCY};
use crate::domain::check::{CheckResult, Dimension, Metrics, Severity};
use crate::domain::dataset::{Dataset, Profile};

pub const CHECK_ID: &str = "ml_categorical_anomalies";

/// Frequency analysis: values seen fewer than `max(rare_min_count,
/// floor(rare_fraction * n))` times in a column are rare.
#[instrument(skip_all, fields(detector = "categorical"))]
pub fn detect(
    dataset: &Dataset,
    profile: &Profile,
    config: &AnomalyConfig,
) -> DetectorOutput<CategoricalAnomaly> {
    let columns = categorical_columns(dataset, profile);
    if columns.is_empty() {
        return DetectorOutput::empty();
    }

    let mut findings = Vec::new();
    let mut total_rare = 0usize;

    for column in &columns {
        let values = column.string_values().unwrap_or_default();
        if values.len() < config.min_column_values {
            continue;
        }

        let mut frequencies: BTreeMap<&str, usize> = BTreeMap::new();
        for v in &values {
            *frequencies.entry(v).or_default() += 1;
        }

        let threshold = config
            .rare_min_count
            .max((values.len() as f64 * config.rare_fraction).floor() as usize);

        let mut rare: Vec<(&str, usize)> = frequencies
            .into_iter()
            .filter(|(_, count)| *count < threshold)
            .collect();
        if rare.is_empty() {
            continue;
        }
        // Most frequent rare values first, ties by value
        rare.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let rare_value_count: usize = rare.iter().map(|(_, c)| c).sum();
        debug!(column = %column.name, rare_value_count, threshold, "Rare values found");
        total_rare += rare_value_count;

        findings.push(CategoricalAnomaly {
            column: column.name.clone(),
            rare_value_count,
            rare_unique_values: rare.len(),
            sample_rare_values: rare
                .iter()
                .take(config.sample_limit)
                .map(|(v, _)| v.to_string())
                .collect(),
            method: METHOD_FREQUENCY.to_string(),
        });
    }

    if findings.is_empty() {
        return DetectorOutput::empty();
    }

    let cells = dataset.row_count() * columns.len();
    let overall_rate = if cells > 0 {
        total_rare as f64 / cells as f64
    } else {
        0.0
    };

    let severity = if overall_rate > config.categorical_medium_rate {
        Severity::Medium
    } else {
        Severity::Low
    };

    let metrics = Metrics::new()
        .with("total_rare_values", total_rare)
        .with("rare_value_rate", overall_rate)
        .with("columns_analyzed", columns.len())
        .with("method", METHOD_FREQUENCY);

    let check = CheckResult::new(CHECK_ID, Dimension::AnomalyDetection)
        .with_passed(overall_rate < config.categorical_max_pass_rate)
        .with_severity(severity)
        .with_metrics(metrics);

    DetectorOutput {
        findings,
        check: Some(check),
    }
}
