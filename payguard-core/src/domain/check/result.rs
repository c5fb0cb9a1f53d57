// payguard-core/src/domain/check/result.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::metrics::Metrics;

/// Quality aspect a check belongs to.
///
/// Unknown names coming from upstream producers collapse into `Unknown`
/// instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Dimension {
    Completeness,
    Validity,
    Uniqueness,
    Consistency,
    Timeliness,
    Integrity,
    Reconciliation,
    AnomalyDetection,
    #[default]
    Unknown,
}

impl Dimension {
    /// The scored vocabulary, in reporting order. `Unknown` is not part of it.
    pub const ALL: [Dimension; 8] = [
        Self::Completeness,
        Self::Validity,
        Self::Uniqueness,
        Self::Consistency,
        Self::Timeliness,
        Self::Integrity,
        Self::Reconciliation,
        Self::AnomalyDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Validity => "validity",
            Self::Uniqueness => "uniqueness",
            Self::Consistency => "consistency",
            Self::Timeliness => "timeliness",
            Self::Integrity => "integrity",
            Self::Reconciliation => "reconciliation",
            Self::AnomalyDetection => "anomaly_detection",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Dimension {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dimension = match s.trim().to_ascii_lowercase().as_str() {
            "completeness" => Self::Completeness,
            "validity" => Self::Validity,
            "uniqueness" => Self::Uniqueness,
            "consistency" => Self::Consistency,
            "timeliness" => Self::Timeliness,
            "integrity" => Self::Integrity,
            "reconciliation" => Self::Reconciliation,
            "anomaly_detection" => Self::AnomalyDetection,
            _ => Self::Unknown,
        };
        Ok(dimension)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Dimension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Infallible: null and unknown names map to Dimension::Unknown
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    /// Lenient: anything unrecognised is treated as `Medium`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let severity = match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        };
        Ok(severity)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

/// One evaluation outcome, produced by a rule-based validator or by the
/// anomaly engine. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(default = "default_check_id", deserialize_with = "check_id_or_default")]
    pub check_id: String,
    #[serde(default)]
    pub dimension: Dimension,
    #[serde(default = "default_passed", deserialize_with = "passed_or_default")]
    pub passed: bool,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Metrics,
}

fn default_check_id() -> String {
    "unknown".to_string()
}

fn default_passed() -> bool {
    true
}

// An explicit `null` reads the same as an absent field.

fn check_id_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_check_id))
}

fn passed_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_passed))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CheckResult {
    pub fn new(check_id: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            check_id: check_id.into(),
            dimension,
            passed: true,
            severity: Severity::default(),
            metrics: Metrics::default(),
        }
    }

    pub fn with_passed(mut self, passed: bool) -> Self {
        self.passed = passed;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn failed(&self) -> bool {
        !self.passed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Critical);
        assert!(Severity::High > Severity::Medium);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() -> Result<()> {
        let check: CheckResult = serde_json::from_str(r#"{"check_id": "completeness_null"}"#)?;
        assert_eq!(check.dimension, Dimension::Unknown);
        assert_eq!(check.severity, Severity::Medium);
        assert!(check.passed);
        assert!(check.metrics.is_empty());
        Ok(())
    }

    #[test]
    fn test_lenient_vocabulary() -> Result<()> {
        let check: CheckResult = serde_json::from_str(
            r#"{"check_id": "x", "dimension": "Freshness", "severity": "BLOCKER", "passed": false}"#,
        )?;
        assert_eq!(check.dimension, Dimension::Unknown);
        assert_eq!(check.severity, Severity::Medium);
        assert!(check.failed());

        let check: CheckResult = serde_json::from_str(
            r#"{"check_id": "y", "dimension": "anomaly_detection", "severity": "Critical"}"#,
        )?;
        assert_eq!(check.dimension, Dimension::AnomalyDetection);
        assert_eq!(check.severity, Severity::Critical);
        Ok(())
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() -> Result<()> {
        let check: CheckResult = serde_json::from_str(
            r#"{"check_id": null, "dimension": null, "passed": null, "severity": null, "metrics": null}"#,
        )?;
        assert_eq!(check.check_id, "unknown");
        assert_eq!(check.dimension, Dimension::Unknown);
        assert!(check.passed);
        assert_eq!(check.severity, Severity::Medium);
        assert!(check.metrics.is_empty());

        let check: CheckResult = serde_json::from_str(
            r#"{"check_id": "nulls", "dimension": "completeness", "passed": false, "severity": null}"#,
        )?;
        assert_eq!(check.dimension, Dimension::Completeness);
        assert_eq!(check.severity, Severity::Medium);
        assert!(check.failed());
        Ok(())
    }

    #[test]
    fn test_dimension_serializes_snake_case() -> Result<()> {
        let json = serde_json::to_string(&Dimension::AnomalyDetection)?;
        assert_eq!(json, "\"anomaly_detection\"");
        Ok(())
    }
}
