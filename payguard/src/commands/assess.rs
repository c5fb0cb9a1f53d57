// payguard/src/commands/assess.rs
//
// USE CASE: Full assessment of a CSV dataset.

use anyhow::Context;
use std::path::PathBuf;

use super::{anomalies_table, load_config, load_dataset, scores_table};
use crate::cli::Format;
use payguard_core::application::run_assessment;
use payguard_core::domain::narrative::Narrator;
use payguard_core::infrastructure::io::{load_checks, write_json};

pub async fn execute(
    dataset: PathBuf,
    checks: Option<PathBuf>,
    project_dir: PathBuf,
    output: Option<PathBuf>,
    format: Format,
    narrator: &dyn Narrator,
) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let data = load_dataset(&dataset).await?;

    let rule_checks = match &checks {
        Some(path) => load_checks(path)
            .with_context(|| format!("Failed to read check results from {:?}", path))?,
        None => Vec::new(),
    };

    let report = run_assessment(&config, data, None, rule_checks, narrator).await;

    if let Some(path) = &output {
        write_json(path, &report)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        eprintln!("📄 Report saved to {}", path.display());
    }

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Table => {
            let narrative = &report.narrative;
            println!("🛡️  Assessment {}", report.run_id);
            println!(
                "   Rows: {}  Columns: {}",
                report.profile.row_count, report.profile.column_count
            );
            println!("\n{}", scores_table(&report.scoring));
            if report.anomalies.total_anomalies > 0 {
                println!("\n{}", anomalies_table(&report.anomalies));
            }
            println!(
                "\nDQS: {:.2}  Status: {}  Risk: {}",
                report.scoring.composite_dqs,
                narrative.quality_status,
                narrative.business_impact.risk_level
            );
            println!("{}", narrative.summary);
            for rec in &narrative.recommendations {
                println!("   ➜ {}", rec);
            }
        }
    }

    Ok(())
}
