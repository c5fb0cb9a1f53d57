// payguard-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayguardError {
    // --- ERREURS DU DOMAINE (dataset shape, caller contract) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing, DuckDB) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for PayguardError {
    fn from(err: std::io::Error) -> Self {
        PayguardError::Infrastructure(InfrastructureError::Io(err))
    }
}
