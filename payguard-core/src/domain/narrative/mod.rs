// payguard-core/src/domain/narrative/mod.rs
//
// Human-readable reading of a scoring run. The narrator is picked once at
// startup; language-model backed narrators live outside this crate and
// implement the same trait.

pub mod deterministic;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::check::{CheckResult, Dimension, Severity};
use crate::domain::dataset::Profile;
use crate::domain::scoring::ScoringResult;

pub use deterministic::DeterministicNarrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityStatus {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
        })
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub check_id: String,
    pub severity: Severity,
    pub dimension: Dimension,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub risk_level: RiskLevel,
    pub payment_processing_risk: String,
    pub compliance_risk: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub quality_status: QualityStatus,
    pub summary: String,
    pub issue_summaries: Vec<IssueSummary>,
    pub recommendations: Vec<String>,
    pub business_impact: BusinessImpact,
    pub generated_by: String,
}

pub trait Narrator: Send + Sync {
    fn name(&self) -> &'static str;

    fn narrate(&self, scoring: &ScoringResult, checks: &[CheckResult], profile: &Profile) -> Narrative;
}
