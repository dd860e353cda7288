//! Label encoding for the target and one-hot encoding for categorical features.

use crate::data::{Column, ColumnData};
use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Maps the distinct target values to contiguous codes `0..k`.
///
/// Classes are ordered by value: numerically for integer and float targets,
/// lexicographically for text. `classes[code]` is the original value rendered
/// as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the classes of a target column. Missing target values are an error.
    pub fn fit(column: &Column) -> Result<Self> {
        let missing = column.missing_count();
        if missing > 0 {
            return Err(ForgeError::InvalidData(format!(
                "target column '{}' has {} missing value(s)",
                column.name(),
                missing
            )));
        }

        let classes = match column.data() {
            ColumnData::Integer(values) => values
                .iter()
                .flatten()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|v| v.to_string())
                .collect(),
            ColumnData::Float(values) => {
                let mut sorted: Vec<f64> = values.iter().flatten().map(|v| v + 0.0).collect();
                sorted.sort_by(|a, b| a.total_cmp(b));
                sorted.dedup();
                sorted.into_iter().map(|v| v.to_string()).collect()
            }
            ColumnData::Text(values) => values
                .iter()
                .flatten()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .cloned()
                .collect(),
        };
        Ok(Self { classes })
    }

    /// Ordered class values; the position is the code.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Encode a column. Values not seen during fitting are an error.
    pub fn transform(&self, column: &Column) -> Result<Vec<usize>> {
        let index: HashMap<&str, usize> = self
            .classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.as_str(), code))
            .collect();

        column
            .cells()
            .enumerate()
            .map(|(row, cell)| {
                let rendered = cell.render().ok_or_else(|| {
                    ForgeError::InvalidData(format!(
                        "target column '{}' is missing a value at row {}",
                        column.name(),
                        row
                    ))
                })?;
                index.get(rendered.as_str()).copied().ok_or_else(|| {
                    ForgeError::InvalidData(format!("unknown class '{}' at row {}", rendered, row))
                })
            })
            .collect()
    }

    /// Decode codes back to class values.
    pub fn inverse_transform(&self, codes: &[usize]) -> Result<Vec<&str>> {
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code).map(String::as_str).ok_or_else(|| {
                    ForgeError::InvalidData(format!(
                        "label code {} has no class (only {} classes)",
                        code,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }
}

/// Expands one categorical column into indicator columns, one per category
/// seen during fitting. Unseen categories encode as all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Sorted training categories.
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    /// Learn categories from (already imputed) values.
    pub fn fit(values: &[Option<&str>]) -> Self {
        let categories = values
            .iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        Self { categories }
    }

    /// Number of indicator columns produced.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Indicator columns, one vector per category, each of `values.len()`.
    pub fn transform(&self, values: &[Option<&str>]) -> Vec<Vec<f64>> {
        let index: HashMap<&str, usize> = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut columns = vec![vec![0.0; values.len()]; self.categories.len()];
        for (row, value) in values.iter().enumerate() {
            if let Some(&col) = value.and_then(|v| index.get(v)) {
                columns[col][row] = 1.0;
            }
        }
        columns
    }

    /// Output column names, `"{column}_{category}"`.
    pub fn feature_names(&self, column: &str) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", column, c))
            .collect()
    }
}
