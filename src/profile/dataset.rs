//! Dataset profiling: shape, types, missingness, cardinality and memory.

use crate::data::{Cell, Column, ColumnData, ColumnKind, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Bytes of index overhead counted for every table.
const INDEX_BYTES: usize = 128;
/// Bytes per numeric cell and per object pointer.
const WORD_BYTES: usize = 8;
/// Fixed overhead of a boxed string object.
const STRING_OBJECT_BYTES: usize = 49;
/// Size of a boxed missing marker.
const MISSING_OBJECT_BYTES: usize = 16;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Summary statistics of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// Number of rows.
    pub n_rows: usize,
    /// Number of columns.
    pub n_cols: usize,
    /// Number of integer or float columns.
    pub numeric_cols: usize,
    /// Number of text columns.
    pub categorical_cols: usize,
    /// Column names in table order.
    pub column_names: Vec<String>,
    /// Inferred kind per column.
    pub column_types: BTreeMap<String, ColumnKind>,
    /// Total number of missing cells.
    pub missing_values: usize,
    /// Missing cells per column.
    pub missing_by_column: BTreeMap<String, usize>,
    /// Distinct non-missing values per column.
    pub cardinality: BTreeMap<String, usize>,
    /// Approximate in-memory size, in megabytes, rounded to 2 decimals.
    pub memory_mb: f64,
}

impl DatasetProfile {
    /// Proportion of missing cells, 0 for an empty table.
    pub fn missing_ratio(&self) -> f64 {
        let total = self.n_rows * self.n_cols;
        if total == 0 {
            0.0
        } else {
            self.missing_values as f64 / total as f64
        }
    }

    /// Kind of a column, if it is in the profile.
    pub fn column_type(&self, column: &str) -> Option<ColumnKind> {
        self.column_types.get(column).copied()
    }

    /// Distinct non-missing values in a column, 0 if unknown.
    pub fn cardinality_of(&self, column: &str) -> usize {
        self.cardinality.get(column).copied().unwrap_or(0)
    }
}

impl std::fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dataset Profile")?;
        writeln!(f, "  Rows:               {}", self.n_rows)?;
        writeln!(f, "  Columns:            {}", self.n_cols)?;
        writeln!(f, "  Numeric columns:    {}", self.numeric_cols)?;
        writeln!(f, "  Categorical columns: {}", self.categorical_cols)?;
        writeln!(
            f,
            "  Missing values:     {} ({:.2}%)",
            self.missing_values,
            self.missing_ratio() * 100.0
        )?;
        writeln!(f, "  Memory:             {:.2} MB", self.memory_mb)?;
        writeln!(f, "  Columns:")?;
        for name in &self.column_names {
            writeln!(
                f,
                "    {:<24} {:<8} unique={:<6} missing={}",
                name,
                self.column_types.get(name).map_or("?", |k| k.name()),
                self.cardinality_of(name),
                self.missing_by_column.get(name).copied().unwrap_or(0)
            )?;
        }
        Ok(())
    }
}

/// Profile a table. Never fails; an empty table yields zeroed counts.
pub fn profile_dataset(table: &Table) -> DatasetProfile {
    let mut column_types = BTreeMap::new();
    let mut missing_by_column = BTreeMap::new();
    let mut cardinality = BTreeMap::new();
    let mut numeric_cols = 0;
    let mut memory_bytes = INDEX_BYTES;

    for column in table.columns() {
        let kind = column.kind();
        if kind.is_numeric() {
            numeric_cols += 1;
        }
        column_types.insert(column.name().to_string(), kind);
        missing_by_column.insert(column.name().to_string(), column.missing_count());
        cardinality.insert(column.name().to_string(), count_distinct(column));
        memory_bytes += column_memory_bytes(column);
    }

    let missing_values = missing_by_column.values().sum();
    let memory_mb = (memory_bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0;

    DatasetProfile {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        numeric_cols,
        categorical_cols: table.n_cols() - numeric_cols,
        column_names: table.column_names().into_iter().map(String::from).collect(),
        column_types,
        missing_values,
        missing_by_column,
        cardinality,
        memory_mb,
    }
}

/// Count distinct non-missing values.
fn count_distinct(column: &Column) -> usize {
    match column.data() {
        ColumnData::Integer(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
        // -0.0 and 0.0 are the same value
        ColumnData::Float(values) => values
            .iter()
            .flatten()
            .map(|v| if *v == 0.0 { 0u64 } else { v.to_bits() })
            .collect::<HashSet<_>>()
            .len(),
        ColumnData::Text(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
    }
}

fn column_memory_bytes(column: &Column) -> usize {
    if column.kind().is_numeric() {
        return WORD_BYTES * column.len();
    }
    column
        .cells()
        .map(|cell| match cell {
            Cell::Text(s) => WORD_BYTES + STRING_OBJECT_BYTES + s.len(),
            _ => WORD_BYTES + MISSING_OBJECT_BYTES,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    /// 30-row iris-style table, 10 rows per species, no missing values.
    fn create_iris_table() -> Table {
        let mut ids = Vec::new();
        let mut sepal = Vec::new();
        let mut petal = Vec::new();
        let mut species = Vec::new();
        for name in ["Iris-setosa", "Iris-versicolor", "Iris-virginica"] {
            for i in 0..10 {
                ids.push(Some(ids.len() as i64 + 1));
                sepal.push(Some(5.0 + i as f64 * 0.1));
                petal.push(Some(1.5 + i as f64 * 0.2));
                species.push(Some(name.to_string()));
            }
        }
        Table::new(vec![
            Column::integer("Id", ids),
            Column::float("SepalLengthCm", sepal),
            Column::float("PetalLengthCm", petal),
            Column::text("Species", species),
        ])
        .unwrap()
    }

    fn create_table_with_missing() -> Table {
        Table::new(vec![
            Column::float("a", vec![Some(1.0), None, Some(3.0), Some(f64::NAN)]),
            Column::text_from("b", &[Some("x"), Some("y"), None, Some("z")]),
            Column::integer("c", vec![Some(10), Some(20), Some(30), Some(40)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_shape_and_names() {
        let table = create_iris_table();
        let profile = profile_dataset(&table);

        assert_eq!(profile.n_rows, 30);
        assert_eq!(profile.n_cols, 4);
        assert_eq!(profile.column_names, table.column_names());
        assert_eq!(profile.numeric_cols, 3);
        assert_eq!(profile.categorical_cols, 1);
    }

    #[test]
    fn test_column_types() {
        let profile = profile_dataset(&create_iris_table());

        assert_eq!(profile.column_type("Id"), Some(ColumnKind::Integer));
        assert_eq!(profile.column_type("SepalLengthCm"), Some(ColumnKind::Float));
        assert_eq!(profile.column_type("Species"), Some(ColumnKind::Text));
    }

    #[test]
    fn test_missing_counts() {
        let profile = profile_dataset(&create_table_with_missing());

        assert_eq!(profile.missing_values, 3);
        assert_eq!(profile.missing_by_column["a"], 2);
        assert_eq!(profile.missing_by_column["b"], 1);
        assert_eq!(profile.missing_by_column["c"], 0);
        assert_eq!(
            profile.missing_values,
            profile.missing_by_column.values().sum::<usize>()
        );
    }

    #[test]
    fn test_no_missing() {
        let profile = profile_dataset(&create_iris_table());
        assert_eq!(profile.missing_values, 0);
        assert!(profile.missing_by_column.values().all(|&v| v == 0));
    }

    #[test]
    fn test_cardinality() {
        let profile = profile_dataset(&create_iris_table());
        assert_eq!(profile.cardinality["Species"], 3);
        assert_eq!(profile.cardinality["Id"], 30);
    }

    #[test]
    fn test_cardinality_ignores_missing() {
        let profile = profile_dataset(&create_table_with_missing());
        assert_eq!(profile.cardinality["a"], 2);
        assert_eq!(profile.cardinality["b"], 3);
    }

    #[test]
    fn test_cardinality_constant_column() {
        let table = Table::new(vec![
            Column::integer("x", vec![Some(7); 4]),
            Column::integer("y", vec![Some(1), Some(2), Some(3), Some(4)]),
        ])
        .unwrap();
        let profile = profile_dataset(&table);
        assert_eq!(profile.cardinality["x"], 1);
        assert_eq!(profile.cardinality["y"], 4);
    }

    #[test]
    fn test_keys_match_columns() {
        let table = create_table_with_missing();
        let profile = profile_dataset(&table);
        let names: Vec<&str> = table.column_names();

        for map_keys in [
            profile.cardinality.keys().map(String::as_str).collect::<Vec<_>>(),
            profile.column_types.keys().map(String::as_str).collect::<Vec<_>>(),
            profile.missing_by_column.keys().map(String::as_str).collect::<Vec<_>>(),
        ] {
            let mut expected = names.clone();
            expected.sort();
            assert_eq!(map_keys, expected);
        }
    }

    #[test]
    fn test_memory_grows_with_rows() {
        let small = profile_dataset(&create_iris_table());
        assert!(small.memory_mb >= 0.0);

        let big_table = Table::new(vec![Column::text(
            "s",
            (0..100_000).map(|i| Some(format!("value-{}", i))).collect(),
        )])
        .unwrap();
        let big = profile_dataset(&big_table);
        assert!(big.memory_mb > small.memory_mb);
        assert!(big.memory_mb > 0.0);
    }

    #[test]
    fn test_empty_table() {
        let profile = profile_dataset(&Table::default());

        assert_eq!(profile.n_rows, 0);
        assert_eq!(profile.n_cols, 0);
        assert_eq!(profile.missing_values, 0);
        assert!(profile.cardinality.is_empty());
        assert!(profile.column_types.is_empty());
        assert!(profile.missing_by_column.is_empty());
        assert_eq!(profile.missing_ratio(), 0.0);
    }

    #[test]
    fn test_zero_rows() {
        let table = Table::new(vec![Column::integer("a", vec![])]).unwrap();
        let profile = profile_dataset(&table);
        assert_eq!(profile.n_rows, 0);
        assert_eq!(profile.n_cols, 1);
        assert_eq!(profile.cardinality["a"], 0);
    }

    #[test]
    fn test_serializes_dtype_names() {
        let profile = profile_dataset(&create_iris_table());
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["column_types"]["Species"], "object");
        assert_eq!(value["column_types"]["Id"], "int64");
        assert_eq!(value["column_types"]["SepalLengthCm"], "float64");
    }
}
