// payguard-core/src/application/mod.rs

pub mod assessment;
pub mod detection;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Le CLI fait simplement :
// `use payguard_core::application::{run_assessment, detect_anomalies};`

pub use assessment::{AssessmentReport, run_assessment};
pub use detection::detect_anomalies;
