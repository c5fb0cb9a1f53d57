pub mod project;

pub use project::{AssessmentConfig, load_assessment_config};
