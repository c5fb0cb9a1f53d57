// payguard-core/src/application/assessment.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::application::detection::detect_anomalies;
use crate::domain::anomaly::{AnomalyDetectionEngine, AnomalyReport};
use crate::domain::check::CheckResult;
use crate::domain::dataset::{Dataset, Profile};
use crate::domain::narrative::{Narrative, Narrator};
use crate::domain::scoring::{ScoringEngine, ScoringResult};
use crate::infrastructure::config::AssessmentConfig;

/// Everything produced by one assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub run_id: String,
    pub profile: Profile,
    pub anomalies: AnomalyReport,
    /// Rule-based checks followed by anomaly checks, as scored.
    pub checks: Vec<CheckResult>,
    pub scoring: ScoringResult,
    pub narrative: Narrative,
}

pub fn new_run_id() -> String {
    format!(
        "run-{}-{:08x}",
        Utc::now().format("%Y%m%dT%H%M%S"),
        rand::random::<u32>()
    )
}

/// Anomaly detection, then scoring of rule-based and anomaly checks
/// together, then narration.
///
/// `profile` defaults to one derived from the dataset.
#[instrument(skip_all, fields(rows = dataset.row_count(), rule_checks = rule_checks.len(), narrator = narrator.name()))]
pub async fn run_assessment(
    config: &AssessmentConfig,
    dataset: Dataset,
    profile: Option<Profile>,
    rule_checks: Vec<CheckResult>,
    narrator: &dyn Narrator,
) -> AssessmentReport {
    let run_id = new_run_id();
    info!(run_id = %run_id, "Starting assessment");

    let profile = profile.unwrap_or_else(|| Profile::from_dataset(&dataset));
    let dataset = Arc::new(dataset);
    let profile = Arc::new(profile);

    let engine = AnomalyDetectionEngine::new(config.anomaly.clone());
    let deadline = config.detector_timeout_ms.map(Duration::from_millis);
    let anomalies = detect_anomalies(&engine, dataset, profile.clone(), deadline).await;

    let mut checks = rule_checks;
    checks.extend(anomalies.check_results.iter().cloned());

    let scoring =
        ScoringEngine::new(config.scoring.clone()).compute_scores(&checks, &profile, &config.dimensions);
    let narrative = narrator.narrate(&scoring, &checks, &profile);

    info!(
        run_id = %run_id,
        composite_dqs = scoring.composite_dqs,
        status = %narrative.quality_status,
        "Assessment finished"
    );

    AssessmentReport {
        run_id,
        profile: Arc::unwrap_or_clone(profile),
        anomalies,
        checks,
        scoring,
        narrative,
    }
}
