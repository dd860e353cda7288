//! End-to-end preprocessing: column selection, label encoding, stratified
//! split, imputation, scaling and one-hot encoding.

use crate::data::{ColumnConfig, FeatureMatrixPair, Table};
use crate::error::{ForgeError, Result};
use crate::preprocess::encode::{LabelEncoder, OneHotEncoder};
use crate::preprocess::impute::{MedianImputer, MostFrequentImputer};
use crate::preprocess::scale::StandardScaler;
use crate::preprocess::split::{stratified_split, StratifiedSplit, DEFAULT_SPLIT_SEED};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Fraction of rows held out for testing when the caller does not say.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Median imputation followed by standardization, for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStep {
    pub column: String,
    pub imputer: MedianImputer,
    pub scaler: StandardScaler,
}

/// Most-frequent imputation followed by one-hot encoding, for one
/// categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStep {
    pub column: String,
    pub imputer: MostFrequentImputer,
    pub encoder: OneHotEncoder,
}

/// Feature transform fitted on a training partition.
///
/// Output columns are the numeric columns in table order, followed by the
/// indicator columns of each categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransform {
    numeric: Vec<NumericStep>,
    categorical: Vec<CategoricalStep>,
}

impl FittedTransform {
    /// Fit on a feature table. Numeric and categorical columns are detected
    /// from the column kinds. Columns with no observed values contribute no
    /// output columns.
    pub fn fit(features: &Table) -> Result<Self> {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for column in features.columns() {
            if column.kind().is_numeric() {
                if column.missing_count() == column.len() {
                    tracing::warn!(column = column.name(), "Dropping numeric column with no observed values");
                    continue;
                }
                let imputer = MedianImputer::fit(column)?;
                let scaler = StandardScaler::fit(&imputer.transform(column)?);
                numeric.push(NumericStep {
                    column: column.name().to_string(),
                    imputer,
                    scaler,
                });
            } else {
                let imputer = MostFrequentImputer::fit(column)?;
                let encoder = OneHotEncoder::fit(&imputer.transform(column)?);
                categorical.push(CategoricalStep {
                    column: column.name().to_string(),
                    imputer,
                    encoder,
                });
            }
        }

        Ok(Self {
            numeric,
            categorical,
        })
    }

    /// Apply the fitted steps to a table holding the same feature columns.
    /// Extra columns are ignored.
    pub fn transform(&self, table: &Table) -> Result<DMatrix<f64>> {
        let mut blocks: Vec<Vec<f64>> = Vec::with_capacity(self.n_output_features());

        for step in &self.numeric {
            let column = table.column(&step.column)?;
            let filled = step.imputer.transform(column)?;
            blocks.push(step.scaler.transform(&filled));
        }
        for step in &self.categorical {
            let column = table.column(&step.column)?;
            let filled = step.imputer.transform(column)?;
            blocks.extend(step.encoder.transform(&filled));
        }

        Ok(DMatrix::from_fn(table.n_rows(), blocks.len(), |row, col| {
            blocks[col][row]
        }))
    }

    /// Number of output columns.
    pub fn n_output_features(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|s| s.encoder.width()).sum::<usize>()
    }

    /// Names of the output columns, in matrix order.
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .map(|s| s.column.clone())
            .chain(
                self.categorical
                    .iter()
                    .flat_map(|s| s.encoder.feature_names(&s.column)),
            )
            .collect()
    }

    pub fn numeric_steps(&self) -> &[NumericStep] {
        &self.numeric
    }

    pub fn categorical_steps(&self) -> &[CategoricalStep] {
        &self.categorical
    }
}

/// Output of [`preprocess_dataset`].
#[derive(Debug, Clone)]
pub struct PreprocessedData {
    pub matrices: FeatureMatrixPair,
    pub transform: FittedTransform,
    /// Source table rows behind each matrix row: `split.train[i]` is the row
    /// of `x_train[i]`, `split.test[i]` the row of `x_test[i]`.
    pub split: StratifiedSplit,
}

impl PreprocessedData {
    pub fn label_classes(&self) -> &[String] {
        &self.matrices.label_classes
    }
}

/// Restrict a table to the columns a config allows.
///
/// Ignored columns are dropped; a non-empty feature allowlist keeps only
/// those columns plus the target. Unknown names are skipped, and the target
/// is always kept.
pub fn apply_column_config(table: &Table, target_column: &str, config: Option<&ColumnConfig>) -> Table {
    let Some(config) = config else {
        return table.clone();
    };

    let ignore: Vec<&str> = config
        .ignore_columns()
        .iter()
        .map(String::as_str)
        .filter(|c| *c != target_column)
        .collect();
    let mut working = table.drop_columns(&ignore);

    if !config.feature_columns().is_empty() {
        let mut keep: Vec<&str> = config.feature_columns().iter().map(String::as_str).collect();
        keep.push(target_column);
        working = working.select_columns(&keep);
    }

    tracing::debug!(
        before = table.n_cols(),
        after = working.n_cols(),
        "Applied column config"
    );
    working
}

/// Preprocess a table into train/test matrices with the default split seed.
pub fn preprocess_dataset(
    table: &Table,
    target_column: &str,
    test_fraction: f64,
    column_config: Option<&ColumnConfig>,
) -> Result<PreprocessedData> {
    preprocess_dataset_with_seed(table, target_column, test_fraction, column_config, DEFAULT_SPLIT_SEED)
}

/// Preprocess a table into train/test matrices.
///
/// Transforms are fitted on the training rows only and then applied to the
/// test rows. The returned matrices contain no missing values.
pub fn preprocess_dataset_with_seed(
    table: &Table,
    target_column: &str,
    test_fraction: f64,
    column_config: Option<&ColumnConfig>,
    seed: u64,
) -> Result<PreprocessedData> {
    let target = table.column(target_column)?;
    if table.n_rows() == 0 {
        return Err(ForgeError::EmptyData("table has no rows".to_string()));
    }

    let working = apply_column_config(table, target_column, column_config);
    let features = working.drop_columns(&[target_column]);

    let label_encoder = LabelEncoder::fit(target)?;
    let labels = label_encoder.transform(target)?;

    let split = stratified_split(&labels, label_encoder.classes(), test_fraction, seed)?;
    let train = features.take_rows(&split.train)?;
    let test = features.take_rows(&split.test)?;

    let transform = FittedTransform::fit(&train)?;
    let x_train = transform.transform(&train)?;
    let x_test = transform.transform(&test)?;

    let y_train = split.train.iter().map(|&row| labels[row]).collect();
    let y_test = split.test.iter().map(|&row| labels[row]).collect();

    let matrices = FeatureMatrixPair::new(
        x_train,
        x_test,
        y_train,
        y_test,
        label_encoder.classes().to_vec(),
    )?;
    if !matrices.is_finite() {
        return Err(ForgeError::InvalidData(
            "encoded features contain non-finite values".to_string(),
        ));
    }

    tracing::info!(
        target = target_column,
        n_train = matrices.x_train.nrows(),
        n_test = matrices.x_test.nrows(),
        n_features = matrices.n_features(),
        n_classes = matrices.n_classes(),
        "Preprocessed dataset"
    );

    Ok(PreprocessedData {
        matrices,
        transform,
        split,
    })
}
