// payguard-core/src/ports/source.rs

// What the application needs from an ingestion backend: a location in, a
// typed in-memory dataset out. It does not know whether DuckDB, a
// dataframe library or a test fixture does the parsing.

use crate::domain::dataset::Dataset;
use crate::error::PayguardError;
use async_trait::async_trait;

#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load(&self, location: &str) -> Result<Dataset, PayguardError>;

    fn engine_name(&self) -> &str;
}
