// payguard/src/commands/mod.rs

pub mod assess;
pub mod detect;
pub mod score;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use std::path::Path;
use tracing::info;

use payguard_core::domain::anomaly::AnomalyReport;
use payguard_core::domain::dataset::Dataset;
use payguard_core::domain::scoring::ScoringResult;
use payguard_core::infrastructure::adapters::DuckDbCsvSource;
use payguard_core::infrastructure::config::{AssessmentConfig, load_assessment_config};
use payguard_core::ports::source::DatasetSource;

pub(crate) fn load_config(project_dir: &Path) -> anyhow::Result<AssessmentConfig> {
    load_assessment_config(project_dir).with_context(|| {
        format!(
            "Failed to load assessment configuration from {:?}",
            project_dir
        )
    })
}

pub(crate) async fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let source = DuckDbCsvSource::new().context("Failed to initialize DuckDB")?;
    let dataset = source
        .load(&path.to_string_lossy())
        .await
        .with_context(|| format!("Failed to load dataset {:?} via {}", path, source.engine_name()))?;
    info!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        engine = source.engine_name(),
        "Dataset loaded"
    );
    Ok(dataset)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub(crate) fn scores_table(scoring: &ScoringResult) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Dimension", "Score", "Weight", "Checks", "Failing", "Note"]);
    for (dimension, ds) in &scoring.dimension_scores {
        let failing = ds
            .explainability
            .failing_checks
            .iter()
            .map(|f| f.check_id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            dimension.to_string(),
            format!("{:.2}", ds.score),
            format!("{:.2}", ds.weight),
            ds.explainability.total_checks.to_string(),
            failing,
            ds.explainability.message.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub(crate) fn anomalies_table(report: &AnomalyReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Detector", "Column", "Count", "Method", "Samples"]);

    for a in &report.numeric_anomalies {
        let samples = a
            .sample_anomalies
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            "numeric".to_string(),
            a.column.clone(),
            a.anomaly_count.to_string(),
            a.method.clone(),
            samples,
        ]);
    }
    for a in &report.categorical_anomalies {
        table.add_row(vec![
            "categorical".to_string(),
            a.column.clone(),
            a.rare_value_count.to_string(),
            a.method.clone(),
            a.sample_rare_values.join(", "),
        ]);
    }
    for a in &report.text_anomalies {
        table.add_row(vec![
            "text".to_string(),
            a.column.clone(),
            a.unusual_length_count.to_string(),
            a.method.clone(),
            a.sample_values.join(", "),
        ]);
    }
    for a in &report.row_anomalies {
        let rows = a
            .sample_indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            "rows".to_string(),
            a.features_used.join(", "),
            a.count.to_string(),
            a.method.clone(),
            rows,
        ]);
    }
    table
}
