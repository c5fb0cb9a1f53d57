// payguard-core/src/domain/anomaly/config.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::domain::check::Severity;

use super::isolation_forest::IsolationForest;
use super::model::OutlierModel;
use super::zscore::RobustZScore;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    IsolationForest,
    RobustZscore,
}

/// Tuning of the four detectors.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Expected fraction of anomalous items.
    #[validate(range(exclusive_min = 0.0, max = 0.5))]
    pub contamination: f64,
    pub model: ModelKind,
    #[validate(range(min = 1, max = 10_000))]
    pub n_trees: usize,
    #[validate(range(min = 2))]
    pub max_samples: usize,
    pub seed: u64,

    // --- Applicability ---
    #[validate(range(min = 2))]
    pub min_column_values: usize,
    #[validate(range(min = 2))]
    pub min_rows_multivariate: usize,
    pub sample_limit: usize,
    pub row_sample_limit: usize,

    // --- Verdicts ---
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_pass_rate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub high_severity_rate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub medium_severity_rate: f64,

    // --- Categorical rarity ---
    #[validate(range(min = 0.0, max = 1.0))]
    pub rare_fraction: f64,
    pub rare_min_count: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub categorical_max_pass_rate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub categorical_medium_rate: f64,

    // --- Text lengths ---
    #[validate(range(exclusive_min = 0.0))]
    pub text_sigma: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            model: ModelKind::IsolationForest,
            n_trees: 100,
            max_samples: 256,
            seed: 42,
            min_column_values: 10,
            min_rows_multivariate: 20,
            sample_limit: 5,
            row_sample_limit: 10,
            max_pass_rate: 0.10,
            high_severity_rate: 0.15,
            medium_severity_rate: 0.05,
            rare_fraction: 0.01,
            rare_min_count: 2,
            categorical_max_pass_rate: 0.05,
            categorical_medium_rate: 0.10,
            text_sigma: 3.0,
        }
    }
}

impl AnomalyConfig {
    /// Severity tiers shared by the numeric and row detectors.
    pub fn severity_for(&self, rate: f64) -> Severity {
        if rate > self.high_severity_rate {
            Severity::High
        } else if rate > self.medium_severity_rate {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Instantiates the configured outlier model.
    pub fn build_model(&self) -> Arc<dyn OutlierModel> {
        match self.model {
            ModelKind::IsolationForest => Arc::new(IsolationForest::new(
                self.n_trees,
                self.max_samples,
                self.seed,
            )),
            ModelKind::RobustZscore => Arc::new(RobustZScore),
        }
    }
}
