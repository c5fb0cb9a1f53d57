// payguard/src/commands/detect.rs
//
// USE CASE: Anomaly detection only, no scoring.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{anomalies_table, load_config, load_dataset};
use crate::cli::Format;
use payguard_core::application::detect_anomalies;
use payguard_core::domain::anomaly::AnomalyDetectionEngine;
use payguard_core::domain::dataset::Profile;

pub async fn execute(dataset: PathBuf, project_dir: PathBuf, format: Format) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let data = load_dataset(&dataset).await?;
    let profile = Profile::from_dataset(&data);

    let engine = AnomalyDetectionEngine::new(config.anomaly);
    let deadline = config.detector_timeout_ms.map(Duration::from_millis);
    let report = detect_anomalies(&engine, Arc::new(data), Arc::new(profile), deadline).await;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Table => {
            println!("{}", anomalies_table(&report));
            println!(
                "\n🔎 {} anomalies ({}, contamination {})",
                report.total_anomalies, report.model, report.contamination
            );
        }
    }
    Ok(())
}
