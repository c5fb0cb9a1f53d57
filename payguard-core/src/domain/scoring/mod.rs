// payguard-core/src/domain/scoring/mod.rs

pub mod composite;
pub mod criticality;
pub mod dimension;
pub mod engine;
pub mod policy;
pub mod result;

pub use composite::CompositeScorer;
pub use criticality::{CriticalityRules, FieldClass, KeywordRule};
pub use dimension::DimensionScorer;
pub use engine::ScoringEngine;
pub use policy::ScoringPolicy;
pub use result::{DimensionScore, Explainability, FailingCheck, ScoringResult, SeverityDistribution};
