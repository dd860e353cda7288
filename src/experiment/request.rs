//! Experiment run requests and their validation.

use crate::data::{ColumnConfig, Table};
use crate::error::{ForgeError, Result};
use crate::models::ModelKind;
use crate::preprocess::DEFAULT_TEST_FRACTION;
use serde::{Deserialize, Serialize};

/// Smallest accepted test fraction.
pub const MIN_TEST_SIZE: f64 = 0.1;
/// Largest accepted test fraction.
pub const MAX_TEST_SIZE: f64 = 0.5;

fn default_test_size() -> f64 {
    DEFAULT_TEST_FRACTION
}

/// A request to preprocess a dataset and train a set of models on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRunRequest {
    pub dataset_id: String,
    pub target_column: String,
    pub model_names: Vec<String>,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// When absent, every non-target column is a feature.
    #[serde(default)]
    pub column_config: Option<ColumnConfig>,
}

impl ExperimentRunRequest {
    pub fn new<S: AsRef<str>>(dataset_id: &str, target_column: &str, model_names: &[S]) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            target_column: target_column.to_string(),
            model_names: model_names.iter().map(|m| m.as_ref().to_string()).collect(),
            test_size: DEFAULT_TEST_FRACTION,
            column_config: None,
        }
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_column_config(mut self, config: ColumnConfig) -> Self {
        self.column_config = Some(config);
        self
    }

    /// Check the request on its own: test size range and model names.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEST_SIZE..=MAX_TEST_SIZE).contains(&self.test_size) {
            return Err(ForgeError::InvalidParameter(format!(
                "test_size must be between {} and {}, got {}",
                MIN_TEST_SIZE, MAX_TEST_SIZE, self.test_size
            )));
        }
        if self.target_column.is_empty() {
            return Err(ForgeError::InvalidParameter(
                "target_column must not be empty".to_string(),
            ));
        }
        self.models()?;
        Ok(())
    }

    /// Check the request against the dataset it targets.
    pub fn validate_against(&self, table: &Table) -> Result<()> {
        self.validate()?;
        if !table.has_column(&self.target_column) {
            return Err(ForgeError::MissingColumn(self.target_column.clone()));
        }
        Ok(())
    }

    /// Requested models, resolved against the registry.
    pub fn models(&self) -> Result<Vec<ModelKind>> {
        if self.model_names.is_empty() {
            return Err(ForgeError::InvalidParameter(
                "at least one model must be requested".to_string(),
            ));
        }
        self.model_names.iter().map(|name| name.parse()).collect()
    }
}
