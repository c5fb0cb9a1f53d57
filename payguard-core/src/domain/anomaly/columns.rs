// payguard-core/src/domain/anomaly/columns.rs
//
// Column selection shared by the detectors. The profile's declared type wins
// over the physical column type when both are usable (ex: an integer `mcc`
// profiled as categorical is not fed to the numeric outlier model).

use crate::domain::dataset::{Column, ColumnData, ColumnKind, Dataset, Profile};

fn effective_kind(column: &Column, profile: &Profile) -> ColumnKind {
    profile
        .declared_kind(&column.name)
        .unwrap_or_else(|| column.kind())
}

pub fn numeric_columns<'a>(dataset: &'a Dataset, profile: &Profile) -> Vec<&'a Column> {
    dataset
        .columns()
        .iter()
        .filter(|c| matches!(c.data, ColumnData::Numeric(_)))
        .filter(|c| effective_kind(c, profile) == ColumnKind::Numeric)
        .collect()
}

/// Columns eligible for frequency analysis: categorical or free text.
pub fn categorical_columns<'a>(dataset: &'a Dataset, profile: &Profile) -> Vec<&'a Column> {
    dataset
        .columns()
        .iter()
        .filter(|c| matches!(c.data, ColumnData::Categorical(_) | ColumnData::Text(_)))
        .filter(|c| {
            matches!(
                effective_kind(c, profile),
                ColumnKind::Categorical | ColumnKind::Text
            )
        })
        .collect()
}

/// Free-text columns only.
pub fn text_columns<'a>(dataset: &'a Dataset, profile: &Profile) -> Vec<&'a Column> {
    dataset
        .columns()
        .iter()
        .filter(|c| matches!(c.data, ColumnData::Categorical(_) | ColumnData::Text(_)))
        .filter(|c| effective_kind(c, profile) == ColumnKind::Text)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::ColumnProfile;
    use anyhow::Result;

    fn sample() -> Result<Dataset> {
        Ok(Dataset::new(vec![
            Column::numeric("amount", vec![Some(1.0)]),
            Column::numeric("mcc", vec![Some(5411.0)]),
            Column::text("merchant_name", vec![Some("ACME".into())]),
            Column::categorical("status", vec![Some("completed".into())]),
            Column::temporal("timestamp", vec![Some("2024-01-01".into())]),
        ])?)
    }

    #[test]
    fn test_selection_without_profile() -> Result<()> {
        let ds = sample()?;
        let profile = Profile::default();
        let names = |cols: Vec<&Column>| cols.iter().map(|c| c.name.clone()).collect::<Vec<_>>();

        assert_eq!(names(numeric_columns(&ds, &profile)), vec!["amount", "mcc"]);
        assert_eq!(
            names(categorical_columns(&ds, &profile)),
            vec!["merchant_name", "status"]
        );
        assert_eq!(names(text_columns(&ds, &profile)), vec!["merchant_name"]);
        Ok(())
    }

    #[test]
    fn test_profile_overrides_kind() -> Result<()> {
        let ds = sample()?;
        let mut profile = Profile::default();
        profile.columns.insert(
            "mcc".into(),
            ColumnProfile {
                inferred_type: Some("category".into()),
                null_count: None,
            },
        );
        profile.columns.insert(
            "merchant_name".into(),
            ColumnProfile {
                inferred_type: Some("categorical".into()),
                null_count: None,
            },
        );

        let numeric: Vec<_> = numeric_columns(&ds, &profile).iter().map(|c| c.name.clone()).collect();
        assert_eq!(numeric, vec!["amount"]);
        assert!(text_columns(&ds, &profile).is_empty());
        assert_eq!(categorical_columns(&ds, &profile).len(), 2);
        Ok(())
    }
}
