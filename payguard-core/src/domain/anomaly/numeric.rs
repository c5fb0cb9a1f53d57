// payguard-core/src/domain/anomaly/numeric.rs

use tracing::{debug, instrument, warn};

use super::columns::numeric_columns;
use super::config::AnomalyConfig;
use super::findings::{DetectorOutput, NumericAnomaly};
use super::model::{FeatureMatrix, OutlierModel, flag_outliers};
use crate::domain::check::{CheckResult, Dimension, Metrics};
use crate::domain::dataset::{Dataset, Profile};

pub const CHECK_ID: &str = "ml_numeric_anomalies";

/// Per-column outlier detection on every numeric column with enough values.
#[instrument(skip_all, fields(detector = "numeric", model = model.name()))]
pub fn detect(
    dataset: &Dataset,
    profile: &Profile,
    config: &AnomalyConfig,
    model: &dyn OutlierModel,
) -> DetectorOutput<NumericAnomaly> {
    let columns = numeric_columns(dataset, profile);
    if columns.is_empty() {
        return DetectorOutput::empty();
    }

    let mut findings = Vec::new();
    let mut total_anomalies = 0usize;
    let mut columns_analyzed = 0usize;
    let mut columns_with_anomalies = 0usize;

    for column in &columns {
        let values = column.numeric_values().unwrap_or_default();
        if values.len() < config.min_column_values {
            debug!(column = %column.name, values = values.len(), "Too few values, skipping");
            continue;
        }

        let scores = match model.fit_and_score(&FeatureMatrix::from_column(&values)) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(column = %column.name, error = %e, "Outlier model failed, skipping column");
                continue;
            }
        };
        columns_analyzed += 1;

        let flags = flag_outliers(&scores, config.contamination);
        let anomaly_count = flags.iter().filter(|f| **f).count();
        if anomaly_count == 0 {
            continue;
        }

        let anomaly_rate = anomaly_count as f64 / values.len() as f64;
        let sample_anomalies = values
            .iter()
            .zip(&flags)
            .filter(|(_, flagged)| **flagged)
            .map(|(v, _)| *v)
            .take(config.sample_limit)
            .collect();

        debug!(column = %column.name, anomaly_count, anomaly_rate, "Numeric anomalies found");
        total_anomalies += anomaly_count;
        if anomaly_rate > config.contamination * 2.0 {
            columns_with_anomalies += 1;
        }

        findings.push(NumericAnomaly {
            column: column.name.clone(),
            anomaly_count,
            anomaly_rate,
            sample_anomalies,
            method: model.name().to_string(),
        });
    }

    if columns_analyzed == 0 {
        return DetectorOutput::empty();
    }

    let cells = dataset.row_count() * columns.len();
    let overall_rate = if cells > 0 {
        total_anomalies as f64 / cells as f64
    } else {
        0.0
    };

    let shown = findings.len().min(config.sample_limit);
    let metrics = Metrics::new()
        .with("total_anomalies", total_anomalies)
        .with("anomaly_rate", overall_rate)
        .with("columns_analyzed", columns.len())
        .with("columns_with_anomalies", columns_with_anomalies)
        .with("method", model.name())
        .with(
            "sample_anomalies",
            serde_json::to_value(&findings[..shown]).unwrap_or_default(),
        );

    let check = CheckResult::new(CHECK_ID, Dimension::AnomalyDetection)
        .with_passed(overall_rate < config.max_pass_rate)
        .with_severity(config.severity_for(overall_rate))
        .with_metrics(metrics);

    DetectorOutput {
        findings,
        check: Some(check),
    }
}
