// payguard-core/src/domain/check/mod.rs

pub mod metrics;
pub mod result;

pub use metrics::Metrics;
pub use result::{CheckResult, Dimension, Severity};
