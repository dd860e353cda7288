//! Column-role suggestions derived from a dataset profile.
//!
//! Each non-target column is checked against three rules, in order, and the
//! first rule that matches marks the column as ignored:
//!
//! 1. Surrogate key: an integer column with one distinct value per row.
//! 2. High-cardinality text: a text column where more than 90% of rows
//!    hold a distinct value.
//! 3. Constant: a column with a single distinct value.
//!
//! Columns matching no rule are left out of the config and are used as
//! features. The suggestion never builds an allowlist.

use crate::data::{ColumnConfig, ColumnKind, ConfigSource};
use crate::profile::DatasetProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique-value ratio above which a text column is treated as an identifier.
pub const HIGH_CARDINALITY_RATIO: f64 = 0.9;

/// Why a column was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    SurrogateKey,
    HighCardinalityText,
    Constant,
}

/// A suggested column config with a reason for every flagged column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSuggestion {
    pub column_config: ColumnConfig,
    /// Column name -> human-readable reason.
    pub column_notes: BTreeMap<String, String>,
}

impl ColumnSuggestion {
    /// Columns the suggestion would drop.
    pub fn ignored(&self) -> &[String] {
        self.column_config.ignore_columns()
    }
}

impl std::fmt::Display for ColumnSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Column Suggestions")?;
        if self.column_notes.is_empty() {
            writeln!(f, "  No columns flagged; all non-target columns are features.")?;
        }
        for column in self.column_config.ignore_columns() {
            let note = self.column_notes.get(column).map_or("", String::as_str);
            writeln!(f, "  ignore {:<24} {}", column, note)?;
        }
        Ok(())
    }
}

/// Classify one column, returning the rule that flags it and its note.
pub fn classify_column(
    profile: &DatasetProfile,
    column: &str,
) -> Option<(ColumnRole, String)> {
    let kind = profile.column_type(column)?;
    let unique = profile.cardinality_of(column);
    let n_rows = profile.n_rows;

    if kind == ColumnKind::Integer && n_rows > 0 && unique == n_rows {
        return Some((
            ColumnRole::SurrogateKey,
            format!("ID column: {}/{} unique = 100%", unique, n_rows),
        ));
    }

    if kind == ColumnKind::Text && n_rows > 0 {
        let ratio = unique as f64 / n_rows as f64;
        if ratio > HIGH_CARDINALITY_RATIO {
            return Some((
                ColumnRole::HighCardinalityText,
                format!(
                    "high-cardinality text column: {:.1}% unique ({}/{})",
                    ratio * 100.0,
                    unique,
                    n_rows
                ),
            ));
        }
    }

    if unique == 1 {
        return Some((
            ColumnRole::Constant,
            format!("constant column: only 1 unique value across {} rows", n_rows),
        ));
    }

    None
}

/// Suggest which columns to ignore when training against `target_column`.
///
/// The target is never flagged. The returned config is tagged `auto`.
pub fn suggest_column_config(profile: &DatasetProfile, target_column: &str) -> ColumnSuggestion {
    let mut ignore_columns = Vec::new();
    let mut column_notes = BTreeMap::new();

    for column in profile.column_names.iter().filter(|c| *c != target_column) {
        if let Some((role, note)) = classify_column(profile, column) {
            tracing::debug!(column = %column, ?role, "Flagged column");
            ignore_columns.push(column.clone());
            column_notes.insert(column.clone(), note);
        }
    }

    ColumnSuggestion {
        column_config: ColumnConfig::ignoring(&ignore_columns, ConfigSource::Auto),
        column_notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Table};
    use crate::profile::profile_dataset;

    /// Kaggle-style iris table: 150 rows, an `Id` surrogate key, four
    /// continuous measurements and a three-class target.
    fn create_iris_kaggle_table() -> Table {
        let n = 150;
        let measure = |scale: f64, offset: f64| -> Vec<Option<f64>> {
            (0..n)
                .map(|i| Some(offset + scale * ((i * 37 % n) as f64 / n as f64) + i as f64 * 1e-6))
                .collect()
        };
        let species: Vec<Option<String>> = (0..n)
            .map(|i| {
                Some(
                    match i / 50 {
                        0 => "Iris-setosa",
                        1 => "Iris-versicolor",
                        _ => "Iris-virginica",
                    }
                    .to_string(),
                )
            })
            .collect();
        Table::new(vec![
            Column::integer("Id", (1..=n as i64).map(Some).collect()),
            Column::float("SepalLengthCm", measure(4.0, 4.0)),
            Column::float("SepalWidthCm", measure(2.5, 2.0)),
            Column::float("PetalLengthCm", measure(6.0, 1.0)),
            Column::float("PetalWidthCm", measure(2.4, 0.1)),
            Column::text("Species", species),
        ])
        .unwrap()
    }

    #[test]
    fn test_detects_integer_id_column() {
        let profile = profile_dataset(&create_iris_kaggle_table());
        let suggestion = suggest_column_config(&profile, "Species");

        assert!(suggestion.ignored().contains(&"Id".to_string()));
        assert!(suggestion.column_notes["Id"].contains("ID column"));
        assert_eq!(suggestion.column_notes["Id"], "ID column: 150/150 unique = 100%");
    }

    #[test]
    fn test_float_features_not_ignored() {
        let profile = profile_dataset(&create_iris_kaggle_table());
        let suggestion = suggest_column_config(&profile, "Species");

        for col in ["SepalLengthCm", "SepalWidthCm", "PetalLengthCm", "PetalWidthCm"] {
            assert!(!suggestion.ignored().contains(&col.to_string()), "{} ignored", col);
        }
    }

    #[test]
    fn test_target_never_flagged() {
        let profile = profile_dataset(&create_iris_kaggle_table());

        // Even an ID-like target stays out of the config
        let suggestion = suggest_column_config(&profile, "Id");
        assert!(!suggestion.ignored().contains(&"Id".to_string()));
        assert!(!suggestion.column_config.feature_columns().contains(&"Id".to_string()));
        assert!(!suggestion.column_notes.contains_key("Id"));

        let suggestion = suggest_column_config(&profile, "Species");
        assert!(!suggestion.column_notes.contains_key("Species"));
    }

    #[test]
    fn test_detects_constant_column() {
        let table = Table::new(vec![
            Column::float("feature", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            Column::text("constant", vec![Some("x".to_string()); 5]),
            Column::integer("target", vec![Some(0), Some(1), Some(0), Some(1), Some(0)]),
        ])
        .unwrap();
        let profile = profile_dataset(&table);
        let suggestion = suggest_column_config(&profile, "target");

        assert_eq!(suggestion.ignored(), &["constant"]);
        assert_eq!(
            suggestion.column_notes["constant"],
            "constant column: only 1 unique value across 5 rows"
        );
    }

    #[test]
    fn test_detects_high_cardinality_text() {
        let table = Table::new(vec![
            Column::text("uuid_col", (0..100).map(|i| Some(format!("key-{:04x}", i * 7919))).collect()),
            Column::integer("feature", (0..100).map(|i| Some(i % 10)).collect()),
            Column::integer("target", (0..100).map(|i| Some(i % 2)).collect()),
        ])
        .unwrap();
        let profile = profile_dataset(&table);
        let suggestion = suggest_column_config(&profile, "target");

        assert!(suggestion.ignored().contains(&"uuid_col".to_string()));
        assert_eq!(
            suggestion.column_notes["uuid_col"],
            "high-cardinality text column: 100.0% unique (100/100)"
        );
        assert!(!suggestion.ignored().contains(&"feature".to_string()));
    }

    #[test]
    fn test_text_at_ratio_threshold_kept() {
        // Exactly 90% unique is not above the threshold
        let values: Vec<Option<String>> = (0..10)
            .map(|i| Some(format!("v{}", if i == 9 { 0 } else { i })))
            .collect();
        let table = Table::new(vec![
            Column::text("code", values),
            Column::integer("target", (0..10).map(|i| Some(i % 2)).collect()),
        ])
        .unwrap();
        let suggestion = suggest_column_config(&profile_dataset(&table), "target");
        assert!(suggestion.ignored().is_empty());
    }

    #[test]
    fn test_float_with_100_pct_unique_not_ignored() {
        let table = Table::new(vec![
            Column::float("salary", (0..50).map(|i| Some(30_000.0 + i as f64 * 1_733.7)).collect()),
            Column::integer("target", (0..50).map(|i| Some(i % 2)).collect()),
        ])
        .unwrap();
        let profile = profile_dataset(&table);
        let suggestion = suggest_column_config(&profile, "target");

        assert!(!suggestion.ignored().contains(&"salary".to_string()));
        assert!(suggestion.column_notes.is_empty());
    }

    #[test]
    fn test_first_rule_wins() {
        // One-row table: the integer column is both an ID and constant
        let table = Table::new(vec![
            Column::integer("key", vec![Some(1)]),
            Column::text_from("target", &[Some("a")]),
        ])
        .unwrap();
        let profile = profile_dataset(&table);
        assert_eq!(
            classify_column(&profile, "key").map(|(role, _)| role),
            Some(ColumnRole::SurrogateKey)
        );
    }

    #[test]
    fn test_config_shape() {
        let profile = profile_dataset(&create_iris_kaggle_table());
        let suggestion = suggest_column_config(&profile, "Species");

        assert!(suggestion.column_config.feature_columns().is_empty());
        assert_eq!(suggestion.column_config.source(), ConfigSource::Auto);
    }

    #[test]
    fn test_zero_rows_flags_nothing() {
        let table = Table::new(vec![
            Column::integer("id", vec![]),
            Column::text("name", vec![]),
            Column::text("target", vec![]),
        ])
        .unwrap();
        let suggestion = suggest_column_config(&profile_dataset(&table), "target");
        assert!(suggestion.ignored().is_empty());
        assert!(suggestion.column_notes.is_empty());
    }
}
