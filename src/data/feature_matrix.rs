//! Numeric train/test matrices handed to the trainer.

use crate::error::{ForgeError, Result};
use nalgebra::DMatrix;

/// Encoded feature matrices and integer labels for one experiment run.
///
/// Rows of `x_train` line up with `y_train`, rows of `x_test` with `y_test`.
/// Every label is an index into `label_classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrixPair {
    pub x_train: DMatrix<f64>,
    pub x_test: DMatrix<f64>,
    pub y_train: Vec<usize>,
    pub y_test: Vec<usize>,
    pub label_classes: Vec<String>,
}

impl FeatureMatrixPair {
    /// Assemble a pair, checking row counts and label ranges.
    pub fn new(
        x_train: DMatrix<f64>,
        x_test: DMatrix<f64>,
        y_train: Vec<usize>,
        y_test: Vec<usize>,
        label_classes: Vec<String>,
    ) -> Result<Self> {
        if x_train.nrows() != y_train.len() {
            return Err(ForgeError::DimensionMismatch {
                expected: x_train.nrows(),
                actual: y_train.len(),
            });
        }
        if x_test.nrows() != y_test.len() {
            return Err(ForgeError::DimensionMismatch {
                expected: x_test.nrows(),
                actual: y_test.len(),
            });
        }
        if x_train.ncols() != x_test.ncols() {
            return Err(ForgeError::DimensionMismatch {
                expected: x_train.ncols(),
                actual: x_test.ncols(),
            });
        }
        let k = label_classes.len();
        if let Some(&bad) = y_train.iter().chain(&y_test).find(|&&y| y >= k) {
            return Err(ForgeError::InvalidData(format!(
                "label code {} has no class (only {} classes)",
                bad, k
            )));
        }
        Ok(Self {
            x_train,
            x_test,
            y_train,
            y_test,
            label_classes,
        })
    }

    /// Number of encoded feature columns.
    pub fn n_features(&self) -> usize {
        self.x_train.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.label_classes.len()
    }

    /// Map label codes back to the original class values.
    pub fn decode<'a>(&'a self, codes: &[usize]) -> Vec<&'a str> {
        codes
            .iter()
            .map(|&c| self.label_classes[c].as_str())
            .collect()
    }

    /// True if neither matrix holds a NaN or infinite value.
    pub fn is_finite(&self) -> bool {
        self.x_train.iter().chain(self.x_test.iter()).all(|v| v.is_finite())
    }
}
