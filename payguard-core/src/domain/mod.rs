pub mod anomaly;
pub mod check;
pub mod dataset;
pub mod error;
pub mod narrative;
pub mod scoring;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use check::{CheckResult, Dimension, Metrics, Severity};
pub use dataset::{Column, Dataset, Profile};
pub use error::DomainError;
