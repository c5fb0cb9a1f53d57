// payguard-core/src/domain/anomaly/findings.rs

use serde::{Deserialize, Serialize};

use crate::domain::check::CheckResult;

pub const METHOD_FREQUENCY: &str = "FrequencyAnalysis";
pub const METHOD_LENGTH: &str = "LengthStatistics";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericAnomaly {
    pub column: String,
    pub anomaly_count: usize,
    pub anomaly_rate: f64,
    pub sample_anomalies: Vec<f64>,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalAnomaly {
    pub column: String,
    pub rare_value_count: usize,
    pub rare_unique_values: usize,
    pub sample_rare_values: Vec<String>,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnomaly {
    pub column: String,
    pub unusual_length_count: usize,
    pub mean_length: f64,
    pub std_length: f64,
    pub sample_values: Vec<String>,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAnomaly {
    pub count: usize,
    pub rate: f64,
    pub sample_indices: Vec<usize>,
    pub features_used: Vec<String>,
    pub method: String,
}

/// What a single detector hands back: its findings plus at most one
/// summarizing check.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOutput<F> {
    pub findings: Vec<F>,
    pub check: Option<CheckResult>,
}

impl<F> DetectorOutput<F> {
    pub fn empty() -> Self {
        Self {
            findings: Vec::new(),
            check: None,
        }
    }
}

impl<F> Default for DetectorOutput<F> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Consolidated result of one anomaly-detection run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub numeric_anomalies: Vec<NumericAnomaly>,
    pub categorical_anomalies: Vec<CategoricalAnomaly>,
    pub text_anomalies: Vec<TextAnomaly>,
    pub row_anomalies: Vec<RowAnomaly>,
    pub check_results: Vec<CheckResult>,
    pub total_anomalies: usize,
    pub duration_ms: u64,
    pub model: String,
    pub contamination: f64,
}

impl AnomalyReport {
    /// Merges the four detector outputs. Check order is fixed (numeric,
    /// categorical, text, rows) whatever order the detectors finished in.
    pub fn consolidate(
        numeric: DetectorOutput<NumericAnomaly>,
        categorical: DetectorOutput<CategoricalAnomaly>,
        text: DetectorOutput<TextAnomaly>,
        rows: DetectorOutput<RowAnomaly>,
        model: &str,
        contamination: f64,
        duration_ms: u64,
    ) -> Self {
        let check_results = [numeric.check, categorical.check, text.check, rows.check]
            .into_iter()
            .flatten()
            .collect();
        let total_anomalies = numeric.findings.len()
            + categorical.findings.len()
            + text.findings.len()
            + rows.findings.len();

        Self {
            numeric_anomalies: numeric.findings,
            categorical_anomalies: categorical.findings,
            text_anomalies: text.findings,
            row_anomalies: rows.findings,
            check_results,
            total_anomalies,
            duration_ms,
            model: model.to_string(),
            contamination,
        }
    }
}
