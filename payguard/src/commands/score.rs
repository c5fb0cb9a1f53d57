// payguard/src/commands/score.rs
//
// USE CASE: Score check results produced elsewhere.

use anyhow::Context;
use std::path::PathBuf;

use super::{load_config, scores_table};
use crate::cli::Format;
use payguard_core::domain::dataset::Profile;
use payguard_core::domain::scoring::ScoringEngine;
use payguard_core::infrastructure::io::{load_checks, load_profile};

pub fn execute(
    checks: PathBuf,
    profile: Option<PathBuf>,
    project_dir: PathBuf,
    format: Format,
) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;

    let checks = load_checks(&checks)
        .with_context(|| format!("Failed to read check results from {:?}", checks))?;
    let profile = match &profile {
        Some(path) => {
            load_profile(path).with_context(|| format!("Failed to read profile from {:?}", path))?
        }
        None => Profile::default(),
    };

    let scoring =
        ScoringEngine::new(config.scoring).compute_scores(&checks, &profile, &config.dimensions);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&scoring)?),
        Format::Table => {
            println!("{}", scores_table(&scoring));
            println!("\nDQS: {:.2}", scoring.composite_dqs);
        }
    }
    Ok(())
}
