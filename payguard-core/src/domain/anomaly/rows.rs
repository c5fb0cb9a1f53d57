// payguard-core/src/domain/anomaly/rows.rs

use tracing::{debug, instrument, warn};

use super::columns::numeric_columns;
use super::config::AnomalyConfig;
use super::findings::{DetectorOutput, RowAnomaly};
use super::model::{FeatureMatrix, OutlierModel, flag_outliers, median, standardize};
use crate::domain::check::{CheckResult, Dimension, Metrics};
use crate::domain::dataset::{ColumnData, Dataset, Profile};

pub const CHECK_ID: &str = "ml_row_anomalies";

/// Multivariate pass: missing cells are median-filled, features are
/// standardized, then whole rows are scored by the outlier model.
#[instrument(skip_all, fields(detector = "rows", model = model.name()))]
pub fn detect(
    dataset: &Dataset,
    profile: &Profile,
    config: &AnomalyConfig,
    model: &dyn OutlierModel,
) -> DetectorOutput<RowAnomaly> {
    let rows = dataset.row_count();
    if rows < config.min_rows_multivariate {
        return DetectorOutput::empty();
    }

    let mut features = Vec::new();
    let mut feature_names = Vec::new();
    for column in numeric_columns(dataset, profile) {
        let ColumnData::Numeric(cells) = &column.data else {
            continue;
        };
        let present: Vec<f64> = column.numeric_values().unwrap_or_default();
        // Nothing to fill an all-missing column with
        if present.is_empty() {
            continue;
        }
        let fill = median(&present);
        features.push(
            cells
                .iter()
                .map(|c| c.filter(|x| x.is_finite()).unwrap_or(fill))
                .collect::<Vec<f64>>(),
        );
        feature_names.push(column.name.clone());
    }

    if features.len() < 2 {
        return DetectorOutput::empty();
    }

    let matrix = match FeatureMatrix::from_columns(&features) {
        Ok(m) => standardize(&m),
        Err(e) => {
            warn!(error = %e, "Could not assemble feature matrix");
            return DetectorOutput::empty();
        }
    };

    let scores = match model.fit_and_score(&matrix) {
        Ok(scores) => scores,
        Err(e) => {
            warn!(error = %e, "Outlier model failed on rows");
            return DetectorOutput::empty();
        }
    };

    let flags = flag_outliers(&scores, config.contamination);
    let sample_indices: Vec<usize> = flags
        .iter()
        .enumerate()
        .filter(|(_, f)| **f)
        .map(|(i, _)| i)
        .take(config.row_sample_limit)
        .collect();
    let count = flags.iter().filter(|f| **f).count();
    let rate = count as f64 / rows as f64;
    let method = format!("{}_Multivariate", model.name());

    debug!(count, rate, features = feature_names.len(), "Row anomalies scored");

    let metrics = Metrics::new()
        .with("anomaly_count", count)
        .with("anomaly_rate", rate)
        .with("features_used", feature_names.len())
        .with("method", method.as_str());

    let check = CheckResult::new(CHECK_ID, Dimension::AnomalyDetection)
        .with_passed(rate < config.max_pass_rate)
        .with_severity(config.severity_for(rate))
        .with_metrics(metrics);

    DetectorOutput {
        findings: vec![RowAnomaly {
            count,
            rate,
            sample_indices,
            features_used: feature_names,
            method,
        }],
        check: Some(check),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::anomaly::isolation_forest::IsolationForest;
    use crate::domain::anomaly::zscore::RobustZScore;
    use crate::domain::dataset::Column;
    use anyhow::Result;

    fn payments(n: usize) -> Result<Dataset> {
        let mut amount: Vec<Option<f64>> = (0..n)
            .map(|i| Some(100.0 + (i % 13) as f64 * 3.5))
            .collect();
        let mut fee: Vec<Option<f64>> = (0..n)
            .map(|i| Some(1.0 + (i % 13) as f64 * 0.035))
            .collect();
        // Row 7: amount and fee disagree wildly; row 11 has a missing amount
        amount[7] = Some(99_000.0);
        fee[7] = Some(-500.0);
        amount[11] = None;
        Ok(Dataset::new(vec![
            Column::numeric("amount", amount),
            Column::numeric("fee", fee),
            Column::text("currency", vec![Some("EUR".into()); n]),
        ])?)
    }

    #[test]
    fn test_row_outlier_in_sample_indices() -> Result<()> {
        let ds = payments(200)?;
        let out = detect(
            &ds,
            &Profile::default(),
            &AnomalyConfig::default(),
            &IsolationForest::default(),
        );

        assert_eq!(out.findings.len(), 1);
        let finding = &out.findings[0];
        assert!(finding.sample_indices.contains(&7));
        assert!(finding.sample_indices.len() <= 10);
        assert_eq!(finding.features_used, vec!["amount", "fee"]);
        assert_eq!(finding.method, "IsolationForest_Multivariate");

        let check = out.check.unwrap();
        assert_eq!(check.check_id, CHECK_ID);
        assert_eq!(check.metrics.number("features_used"), Some(2.0));
        Ok(())
    }

    #[test]
    fn test_alternative_model_names_method() -> Result<()> {
        let ds = payments(50)?;
        let out = detect(&ds, &Profile::default(), &AnomalyConfig::default(), &RobustZScore);
        assert_eq!(out.findings[0].method, "RobustZScore_Multivariate");
        assert!(out.findings[0].sample_indices.contains(&7));
        Ok(())
    }

    #[test]
    fn test_too_few_rows() -> Result<()> {
        let ds = payments(19)?;
        let out = detect(
            &ds,
            &Profile::default(),
            &AnomalyConfig::default(),
            &IsolationForest::default(),
        );
        assert!(out.check.is_none());
        Ok(())
    }

    #[test]
    fn test_single_numeric_column_not_applicable() -> Result<()> {
        let ds = Dataset::new(vec![Column::numeric(
            "amount",
            (0..50).map(|i| Some(i as f64)).collect(),
        )])?;
        let out = detect(
            &ds,
            &Profile::default(),
            &AnomalyConfig::default(),
            &IsolationForest::default(),
        );
        assert!(out.findings.is_empty());
        Ok(())
    }
}
