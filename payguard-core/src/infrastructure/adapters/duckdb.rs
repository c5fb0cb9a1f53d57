// payguard-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

// Imports Hexagonaux
use crate::domain::dataset::{Column, ColumnKind, Dataset};
use crate::error::PayguardError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::source::DatasetSource;

const INPUT_TABLE: &str = "payguard_input";

/// Loads CSV files through DuckDB's type sniffing (`read_csv_auto`).
pub struct DuckDbCsvSource {
    conn: Arc<Mutex<Connection>>,
}

enum Buffer {
    Numeric(Vec<Option<f64>>),
    Strings(Vec<Option<String>>),
}

impl DuckDbCsvSource {
    pub fn new() -> Result<Self, InfrastructureError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    #[instrument(skip(self), fields(engine = "duckdb"))]
    pub fn load_csv(&self, path: &Path) -> Result<Dataset, PayguardError> {
        if !path.exists() {
            return Err(InfrastructureError::InputNotFound(path.display().to_string()).into());
        }
        let columns = self.read_columns(path)?;
        debug!(columns = columns.len(), "CSV loaded");
        Ok(Dataset::new(columns)?)
    }

    fn read_columns(&self, path: &Path) -> Result<Vec<Column>, InfrastructureError> {
        let conn = self.conn.lock().map_err(|_| {
            InfrastructureError::Io(std::io::Error::other("DuckDB Mutex Poisoned"))
        })?;

        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv_auto('{}')",
            INPUT_TABLE,
            path.display().to_string().replace('\'', "''")
        ))?;

        let schema = {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", INPUT_TABLE))?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>("name")?, row.get::<_, String>("type")?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        if schema.is_empty() {
            return Ok(Vec::new());
        }

        let kinds: Vec<ColumnKind> = schema.iter().map(|(_, t)| kind_for_duckdb_type(t)).collect();
        let projection = schema
            .iter()
            .zip(&kinds)
            .map(|((name, _), kind)| {
                let ident = quote_ident(name);
                match kind {
                    ColumnKind::Numeric => format!("TRY_CAST({ident} AS DOUBLE)"),
                    _ => format!("CAST({ident} AS VARCHAR)"),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut buffers: Vec<Buffer> = kinds
            .iter()
            .map(|k| match k {
                ColumnKind::Numeric => Buffer::Numeric(Vec::new()),
                _ => Buffer::Strings(Vec::new()),
            })
            .collect();

        let mut stmt = conn.prepare(&format!("SELECT {} FROM {}", projection, INPUT_TABLE))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (i, buffer) in buffers.iter_mut().enumerate() {
                match buffer {
                    Buffer::Numeric(v) => v.push(row.get::<_, Option<f64>>(i)?),
                    Buffer::Strings(v) => v.push(row.get::<_, Option<String>>(i)?),
                }
            }
        }

        Ok(schema
            .into_iter()
            .zip(kinds)
            .zip(buffers)
            .map(|(((name, _), kind), buffer)| match (kind, buffer) {
                (_, Buffer::Numeric(v)) => Column::numeric(name, v),
                (ColumnKind::Temporal, Buffer::Strings(v)) => Column::temporal(name, v),
                (_, Buffer::Strings(v)) => Column::text(name, v),
            })
            .collect())
    }
}

#[async_trait]
impl DatasetSource for DuckDbCsvSource {
    async fn load(&self, location: &str) -> Result<Dataset, PayguardError> {
        self.load_csv(Path::new(location))
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

/// Integers, floats and decimals are numeric; dates and times temporal;
/// everything else (VARCHAR, BOOLEAN, UUID...) is text.
pub fn kind_for_duckdb_type(type_name: &str) -> ColumnKind {
    const NUMERIC: [&str; 15] = [
        "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "HUGEINT", "UTINYINT", "USMALLINT",
        "UINTEGER", "UBIGINT", "UHUGEINT", "FLOAT", "DOUBLE", "REAL", "DECIMAL", "NUMERIC",
    ];
    let upper = type_name.trim().to_ascii_uppercase();
    if NUMERIC.iter().any(|t| upper.starts_with(t)) {
        ColumnKind::Numeric
    } else if upper.starts_with("DATE") || upper.starts_with("TIME") {
        ColumnKind::Temporal
    } else {
        ColumnKind::Text
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::ColumnData;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    const CSV: &str = "\
txn_id,amount,currency,mcc,created_at,\"merchant name\"
T001,12.50,EUR,5411,2024-01-01 10:00:00,Corner Cafe
T002,,USD,5812,2024-01-01 11:30:00,ACME
T003,99.99,EUR,5411,2024-01-02 09:15:00,
";

    fn column<'a>(ds: &'a Dataset, name: &str) -> Option<&'a Column> {
        ds.columns().iter().find(|c| c.name == name)
    }

    #[tokio::test]
    async fn test_csv_types_and_nulls() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("payments.csv");
        fs::write(&path, CSV)?;

        let source = DuckDbCsvSource::new()?;
        assert_eq!(source.engine_name(), "duckdb");
        let ds = source.load(path.to_str().unwrap()).await?;

        assert_eq!(ds.row_count(), 3);
        assert_eq!(
            ds.column_names().collect::<Vec<_>>(),
            vec!["txn_id", "amount", "currency", "mcc", "created_at", "merchant name"]
        );
        assert_eq!(column(&ds, "txn_id").unwrap().kind(), ColumnKind::Text);
        assert_eq!(column(&ds, "mcc").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(column(&ds, "created_at").unwrap().kind(), ColumnKind::Temporal);

        let amount = column(&ds, "amount").unwrap();
        assert_eq!(amount.data, ColumnData::Numeric(vec![Some(12.5), None, Some(99.99)]));
        assert_eq!(column(&ds, "merchant name").unwrap().data.null_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file() -> Result<()> {
        let source = DuckDbCsvSource::new()?;
        let err = source.load("/definitely/not/here.csv").await.unwrap_err();
        assert!(matches!(
            err,
            PayguardError::Infrastructure(InfrastructureError::InputNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(kind_for_duckdb_type("BIGINT"), ColumnKind::Numeric);
        assert_eq!(kind_for_duckdb_type("DECIMAL(18,3)"), ColumnKind::Numeric);
        assert_eq!(kind_for_duckdb_type("TIMESTAMP WITH TIME ZONE"), ColumnKind::Temporal);
        assert_eq!(kind_for_duckdb_type("DATE"), ColumnKind::Temporal);
        assert_eq!(kind_for_duckdb_type("VARCHAR"), ColumnKind::Text);
        assert_eq!(kind_for_duckdb_type("BOOLEAN"), ColumnKind::Text);
    }
}
