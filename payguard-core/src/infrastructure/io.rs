// payguard-core/src/infrastructure/io.rs
//
// JSON in (rule-based checks, optional profile), JSON out (reports).

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

use crate::domain::check::CheckResult;
use crate::domain::dataset::Profile;
use crate::infrastructure::error::InfrastructureError;

fn read_input(path: &Path) -> Result<String, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::InputNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Reads a JSON array of checks. Missing fields take their neutral defaults.
#[instrument]
pub fn load_checks(path: &Path) -> Result<Vec<CheckResult>, InfrastructureError> {
    let checks: Vec<CheckResult> = serde_json::from_str(&read_input(path)?)?;
    debug!(count = checks.len(), "Checks loaded");
    Ok(checks)
}

#[instrument]
pub fn load_profile(path: &Path) -> Result<Profile, InfrastructureError> {
    Ok(serde_json::from_str(&read_input(path)?)?)
}

/// Serializes `value` as pretty JSON and swaps it into place, so readers see
/// either the previous report or the new one.
#[instrument(skip(value))]
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), InfrastructureError> {
    let json = serde_json::to_vec_pretty(value)?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory as the target so the final rename stays on one filesystem
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(&json)?;
    temp_file.write_all(b"\n")?;
    temp_file.persist(path).map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}
