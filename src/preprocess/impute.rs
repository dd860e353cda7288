//! Missing-value imputation fitted on a training partition.

use crate::data::Column;
use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fills missing numeric cells with the median seen during fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    /// Median of the observed training values; 0.0 if none were observed.
    /// Infinite values are rejected on fit and transform.
    pub fill: f64,
}

impl MedianImputer {
    /// Fit on a numeric column.
    pub fn fit(column: &Column) -> Result<Self> {
        let observed: Vec<f64> = numeric_cells(column)?.into_iter().flatten().collect();
        Ok(Self {
            fill: median(&observed).unwrap_or(0.0),
        })
    }

    /// Numeric values of `column` with gaps filled.
    pub fn transform(&self, column: &Column) -> Result<Vec<f64>> {
        Ok(numeric_cells(column)?
            .into_iter()
            .map(|v| v.unwrap_or(self.fill))
            .collect())
    }
}

/// Fills missing text cells with the most frequent value seen during fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    /// Most frequent training value (smallest on ties); `None` if the column
    /// had no observed values.
    pub fill: Option<String>,
}

impl MostFrequentImputer {
    /// Fit on a text column.
    pub fn fit(column: &Column) -> Result<Self> {
        let cells = text_cells(column)?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in cells.into_iter().flatten() {
            *counts.entry(value).or_default() += 1;
        }
        let fill = counts
            .into_iter()
            .max_by(|(a_val, a_n), (b_val, b_n)| a_n.cmp(b_n).then(b_val.cmp(a_val)))
            .map(|(value, _)| value.to_string());
        Ok(Self { fill })
    }

    /// Text values of `column` with gaps filled. A cell stays `None` only
    /// when nothing was observed during fitting.
    pub fn transform<'a>(&'a self, column: &'a Column) -> Result<Vec<Option<&'a str>>> {
        Ok(text_cells(column)?
            .into_iter()
            .map(|v| v.or(self.fill.as_deref()))
            .collect())
    }
}

/// Median of a slice; `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 0 {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Some(sorted[n / 2])
    }
}

fn numeric_cells(column: &Column) -> Result<Vec<Option<f64>>> {
    if !column.kind().is_numeric() {
        return Err(ForgeError::InvalidData(format!(
            "column '{}' is not numeric",
            column.name()
        )));
    }
    let values: Vec<Option<f64>> = column.cells().map(|c| c.as_f64()).collect();
    if let Some(row) = values.iter().position(|v| v.is_some_and(|v| !v.is_finite())) {
        return Err(ForgeError::InvalidData(format!(
            "column '{}' has a non-finite value at row {}",
            column.name(),
            row
        )));
    }
    Ok(values)
}

fn text_cells(column: &Column) -> Result<Vec<Option<&str>>> {
    if column.kind().is_numeric() {
        return Err(ForgeError::InvalidData(format!(
            "column '{}' is not categorical",
            column.name()
        )));
    }
    Ok(column.cells().map(|c| c.as_text()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_median_imputer() {
        let column = Column::float("x", vec![Some(1.0), None, Some(3.0), Some(10.0)]);
        let imputer = MedianImputer::fit(&column).unwrap();
        assert_relative_eq!(imputer.fill, 3.0);

        let filled = imputer.transform(&column).unwrap();
        assert_eq!(filled, vec![1.0, 3.0, 3.0, 10.0]);
    }

    #[test]
    fn test_median_imputer_integer_column() {
        let column = Column::integer("n", vec![Some(10), Some(20), None, Some(50)]);
        let imputer = MedianImputer::fit(&column).unwrap();
        assert_relative_eq!(imputer.fill, 20.0);
    }

    #[test]
    fn test_median_imputer_all_missing() {
        let column = Column::float("x", vec![None, None]);
        let imputer = MedianImputer::fit(&column).unwrap();
        assert_eq!(imputer.transform(&column).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_median_imputer_rejects_infinity() {
        let column = Column::float("x", vec![Some(f64::INFINITY), Some(1.0)]);
        assert!(matches!(MedianImputer::fit(&column), Err(ForgeError::InvalidData(_))));

        let imputer = MedianImputer::fit(&Column::float("x", vec![Some(1.0)])).unwrap();
        let test = Column::float("x", vec![Some(2.0), Some(f64::NEG_INFINITY)]);
        assert!(imputer.transform(&test).is_err());
    }

    #[test]
    fn test_median_imputer_rejects_text() {
        let column = Column::text_from("c", &[Some("a")]);
        assert!(MedianImputer::fit(&column).is_err());
    }

    #[test]
    fn test_most_frequent_imputer() {
        let column = Column::text_from("c", &[Some("A"), Some("B"), None, Some("A"), Some("B"), Some("B")]);
        let imputer = MostFrequentImputer::fit(&column).unwrap();
        assert_eq!(imputer.fill.as_deref(), Some("B"));

        let filled = imputer.transform(&column).unwrap();
        assert_eq!(filled[2], Some("B"));
        assert!(filled.iter().all(Option::is_some));
    }

    #[test]
    fn test_most_frequent_tie_takes_smallest() {
        let column = Column::text_from("c", &[Some("b"), Some("a"), None]);
        let imputer = MostFrequentImputer::fit(&column).unwrap();
        assert_eq!(imputer.fill.as_deref(), Some("a"));
    }

    #[test]
    fn test_most_frequent_fill_applies_to_new_data() {
        let train = Column::text_from("c", &[Some("x"), Some("x"), Some("y")]);
        let test = Column::text_from("c", &[None, Some("z")]);
        let imputer = MostFrequentImputer::fit(&train).unwrap();
        assert_eq!(imputer.transform(&test).unwrap(), vec![Some("x"), Some("z")]);
    }
}
