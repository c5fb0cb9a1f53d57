// payguard-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Caller contract violations. Data-quality problems never end up here:
/// they are scored, not raised.
#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Ragged dataset: column '{column}' has {actual} rows, expected {expected}")]
    #[diagnostic(
        code(payguard::domain::ragged_dataset),
        help("Every column of a dataset must have the same number of rows.")
    )]
    RaggedDataset {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name in dataset: '{0}'")]
    #[diagnostic(code(payguard::domain::duplicate_column))]
    DuplicateColumn(String),

    #[error("Invalid feature matrix: {0}")]
    #[diagnostic(code(payguard::domain::feature_matrix))]
    InvalidFeatureMatrix(String),
}
