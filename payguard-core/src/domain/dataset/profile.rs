// payguard-core/src/domain/dataset/profile.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::table::{ColumnKind, Dataset};

/// Dataset description produced upstream. Read-only for this crate: it is a
/// weighting signal (column names) and detector context (inferred types).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnProfile>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnProfile {
    #[serde(default, alias = "type", alias = "dtype")]
    pub inferred_type: Option<String>,
    #[serde(default)]
    pub null_count: Option<usize>,
}

impl Profile {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let columns = dataset
            .columns()
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    ColumnProfile {
                        inferred_type: Some(c.kind().as_str().to_string()),
                        null_count: Some(c.data.null_count()),
                    },
                )
            })
            .collect();

        Self {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            columns,
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Kind declared by the profile for `column`, if it names a known one.
    pub fn declared_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .get(column)?
            .inferred_type
            .as_deref()
            .and_then(ColumnKind::from_type_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;
    use anyhow::Result;

    #[test]
    fn test_profile_from_dataset() -> Result<()> {
        let dataset = Dataset::new(vec![
            Column::numeric("amount", vec![Some(1.0), None]),
            Column::text("currency", vec![Some("EUR".into()), Some("USD".into())]),
        ])?;
        let profile = Profile::from_dataset(&dataset);

        assert_eq!(profile.row_count, 2);
        assert_eq!(profile.column_count, 2);
        assert_eq!(profile.columns["amount"].null_count, Some(1));
        assert_eq!(profile.declared_kind("currency"), Some(ColumnKind::Text));
        assert_eq!(profile.declared_kind("missing"), None);
        Ok(())
    }

    #[test]
    fn test_profile_accepts_pandas_style_types() -> Result<()> {
        let json = r#"{
            "row_count": 10,
            "column_count": 2,
            "columns": {
                "status": {"dtype": "category"},
                "amount": {"type": "float64", "null_count": 0}
            }
        }"#;
        let profile: Profile = serde_json::from_str(json)?;
        assert_eq!(profile.declared_kind("status"), Some(ColumnKind::Categorical));
        assert_eq!(profile.declared_kind("amount"), Some(ColumnKind::Numeric));
        Ok(())
    }
}
