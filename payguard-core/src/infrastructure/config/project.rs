// payguard-core/src/infrastructure/config/project.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use crate::domain::anomaly::AnomalyConfig;
use crate::domain::check::Dimension;
use crate::domain::scoring::ScoringPolicy;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["payguard.yaml", "payguard.yml"];

pub const ENV_CONTAMINATION: &str = "PAYGUARD_CONTAMINATION";
pub const ENV_SEED: &str = "PAYGUARD_SEED";
pub const ENV_DETECTOR_TIMEOUT_MS: &str = "PAYGUARD_DETECTOR_TIMEOUT_MS";

/// Everything a run needs besides its inputs. Every section is optional in
/// the YAML file.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Dimensions scored. Reports list them in `Dimension` order, whatever
    /// the order here.
    #[validate(
        length(min = 1, message = "At least one dimension must be scored"),
        custom(function = "validate_known_dimensions")
    )]
    pub dimensions: Vec<Dimension>,

    #[validate(nested)]
    pub anomaly: AnomalyConfig,

    #[validate(nested)]
    pub scoring: ScoringPolicy,

    /// Deadline for each anomaly detector. None = no deadline.
    #[validate(range(min = 1))]
    pub detector_timeout_ms: Option<u64>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimension::ALL.to_vec(),
            anomaly: AnomalyConfig::default(),
            scoring: ScoringPolicy::default(),
            detector_timeout_ms: None,
        }
    }
}

fn validate_known_dimensions(dimensions: &[Dimension]) -> Result<(), ValidationError> {
    if dimensions.contains(&Dimension::Unknown) {
        Err(ValidationError::new("unknown_dimension")
            .with_message("Unrecognised dimension name in `dimensions`".into()))
    } else {
        Ok(())
    }
}

// --- LOADER ---

/// Loads `payguard.yaml` from `project_dir` (defaults when absent), applies
/// environment overrides, then validates.
#[instrument(skip(project_dir))]
pub fn load_assessment_config(project_dir: &Path) -> Result<AssessmentConfig, InfrastructureError> {
    let mut config = match find_main_config(project_dir) {
        Some(path) => {
            info!(path = ?path, "Loading assessment config");
            let content = fs::read_to_string(&path)?;
            parse_config(&content)?
        }
        None => {
            info!(dir = ?project_dir, "No payguard.yaml found, using defaults");
            AssessmentConfig::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<AssessmentConfig, InfrastructureError> {
    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(AssessmentConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

fn find_main_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

/// Layering: environment wins over the file. `lookup` abstracts the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut AssessmentConfig, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_CONTAMINATION) {
        let parsed = parse_env::<f64>(ENV_CONTAMINATION, &val)?;
        info!(old = config.anomaly.contamination, new = parsed, "Overriding contamination via ENV");
        config.anomaly.contamination = parsed;
    }
    if let Some(val) = lookup(ENV_SEED) {
        let parsed = parse_env::<u64>(ENV_SEED, &val)?;
        info!(old = config.anomaly.seed, new = parsed, "Overriding seed via ENV");
        config.anomaly.seed = parsed;
    }
    if let Some(val) = lookup(ENV_DETECTOR_TIMEOUT_MS) {
        let parsed = parse_env::<u64>(ENV_DETECTOR_TIMEOUT_MS, &val)?;
        info!(old = ?config.detector_timeout_ms, new = parsed, "Overriding detector timeout via ENV");
        config.detector_timeout_ms = Some(parsed);
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, InfrastructureError> {
    value
        .trim()
        .parse()
        .map_err(|_| InfrastructureError::ConfigError(format!("{key}: cannot parse '{value}'")))
}
