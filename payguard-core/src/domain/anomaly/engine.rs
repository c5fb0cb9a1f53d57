// payguard-core/src/domain/anomaly/engine.rs

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use super::config::AnomalyConfig;
use super::findings::{
    AnomalyReport, CategoricalAnomaly, DetectorOutput, NumericAnomaly, RowAnomaly, TextAnomaly,
};
use super::model::OutlierModel;
use super::{categorical, numeric, rows, text};
use crate::domain::dataset::{Dataset, Profile};

/// Runs the four detectors against one dataset.
///
/// Detectors never fail: anything that prevents one from running (no
/// eligible column, too few rows, model error) yields an empty output.
/// The engine is cheap to clone and shareable across threads.
#[derive(Clone)]
pub struct AnomalyDetectionEngine {
    config: AnomalyConfig,
    model: Arc<dyn OutlierModel>,
}

impl AnomalyDetectionEngine {
    pub fn new(config: AnomalyConfig) -> Self {
        let model = config.build_model();
        Self { config, model }
    }

    /// Substitutes the outlier model used by the numeric and row detectors.
    pub fn with_model(config: AnomalyConfig, model: Arc<dyn OutlierModel>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn detect_numeric(&self, dataset: &Dataset, profile: &Profile) -> DetectorOutput<NumericAnomaly> {
        numeric::detect(dataset, profile, &self.config, self.model.as_ref())
    }

    pub fn detect_categorical(
        &self,
        dataset: &Dataset,
        profile: &Profile,
    ) -> DetectorOutput<CategoricalAnomaly> {
        categorical::detect(dataset, profile, &self.config)
    }

    pub fn detect_text(&self, dataset: &Dataset, profile: &Profile) -> DetectorOutput<TextAnomaly> {
        text::detect(dataset, profile, &self.config)
    }

    pub fn detect_rows(&self, dataset: &Dataset, profile: &Profile) -> DetectorOutput<RowAnomaly> {
        rows::detect(dataset, profile, &self.config, self.model.as_ref())
    }

    /// Sequential run of all detectors.
    #[instrument(skip_all, fields(rows = dataset.row_count(), columns = dataset.column_count()))]
    pub fn detect(&self, dataset: &Dataset, profile: &Profile) -> AnomalyReport {
        let start = Instant::now();

        let report = self.consolidate(
            self.detect_numeric(dataset, profile),
            self.detect_categorical(dataset, profile),
            self.detect_text(dataset, profile),
            self.detect_rows(dataset, profile),
            start.elapsed().as_millis() as u64,
        );

        info!(
            total_anomalies = report.total_anomalies,
            checks = report.check_results.len(),
            duration_ms = report.duration_ms,
            "Anomaly detection finished"
        );
        report
    }

    pub fn consolidate(
        &self,
        numeric: DetectorOutput<NumericAnomaly>,
        categorical: DetectorOutput<CategoricalAnomaly>,
        text: DetectorOutput<TextAnomaly>,
        rows: DetectorOutput<RowAnomaly>,
        duration_ms: u64,
    ) -> AnomalyReport {
        AnomalyReport::consolidate(
            numeric,
            categorical,
            text,
            rows,
            self.model.name(),
            self.config.contamination,
            duration_ms,
        )
    }
}

impl Default for AnomalyDetectionEngine {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

impl std::fmt::Debug for AnomalyDetectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetectionEngine")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish()
    }
}
