// payguard-core/src/domain/dataset/table.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Text,
    Temporal,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Text => "text",
            Self::Temporal => "temporal",
        }
    }

    /// Loose parsing of profiler type names ("float64", "object", "datetime"...).
    pub fn from_type_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return None;
        }
        if ["int", "float", "double", "decimal", "numeric", "number", "real"]
            .iter()
            .any(|k| lower.contains(k))
        {
            return Some(Self::Numeric);
        }
        if ["date", "time", "temporal"].iter().any(|k| lower.contains(k)) {
            return Some(Self::Temporal);
        }
        if ["categor", "enum", "bool"].iter().any(|k| lower.contains(k)) {
            return Some(Self::Categorical);
        }
        if ["text", "string", "object", "varchar", "char", "str"]
            .iter()
            .any(|k| lower.contains(k))
        {
            return Some(Self::Text);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    Text(Vec<Option<String>>),
    Temporal(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) | Self::Text(v) | Self::Temporal(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
            Self::Text(_) => ColumnKind::Text,
            Self::Temporal(_) => ColumnKind::Temporal,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            // NaN and infinities count as missing, like a dropped value
            Self::Numeric(v) => v
                .iter()
                .filter(|x| !matches!(x, Some(f) if f.is_finite()))
                .count(),
            Self::Categorical(v) | Self::Text(v) | Self::Temporal(v) => {
                v.iter().filter(|x| x.is_none()).count()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn temporal(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Temporal(values),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    /// Non-missing finite numeric values, or `None` for non-numeric columns.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match &self.data {
            ColumnData::Numeric(v) => Some(
                v.iter()
                    .flatten()
                    .copied()
                    .filter(|x| x.is_finite())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Non-missing string values, or `None` for numeric columns.
    pub fn string_values(&self) -> Option<Vec<&str>> {
        match &self.data {
            ColumnData::Numeric(_) => None,
            ColumnData::Categorical(v) | ColumnData::Text(v) | ColumnData::Temporal(v) => {
                Some(v.iter().flatten().map(String::as_str).collect())
            }
        }
    }
}

/// In-memory tabular dataset, column-oriented.
///
/// All columns have the same number of rows and unique names; `Dataset::new`
/// is the only constructor and enforces both.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, DomainError> {
        let row_count = columns.first().map(|c| c.data.len()).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DomainError::DuplicateColumn(column.name.clone()));
            }
            if column.data.len() != row_count {
                return Err(DomainError::RaggedDataset {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.data.len(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
