// payguard-core/src/domain/anomaly/mod.rs

pub mod categorical;
pub mod columns;
pub mod config;
pub mod engine;
pub mod findings;
pub mod isolation_forest;
pub mod model;
pub mod numeric;
pub mod rows;
pub mod text;
pub mod zscore;

pub use config::{AnomalyConfig, ModelKind};
pub use engine::AnomalyDetectionEngine;
pub use findings::{
    AnomalyReport, CategoricalAnomaly, DetectorOutput, NumericAnomaly, RowAnomaly, TextAnomaly,
};
pub use isolation_forest::IsolationForest;
pub use model::{AnomalyError, FeatureMatrix, OutlierModel};
pub use zscore::RobustZScore;
