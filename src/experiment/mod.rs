//! Experiment preparation: validate a run request, profile the dataset,
//! estimate runtime and build the train/test matrices.

pub mod artifacts;
pub mod leaderboard;
pub mod request;

pub use artifacts::{read_feature_matrices, write_experiment, ArtifactPaths};
pub use leaderboard::{evaluate, Averaging, Leaderboard, ModelMetrics, ModelResult, POSITIVE_LABEL};
pub use request::{ExperimentRunRequest, MAX_TEST_SIZE, MIN_TEST_SIZE};

use crate::data::{ColumnConfig, Table};
use crate::error::Result;
use crate::estimate::{estimate_runtime, RuntimeEstimate};
use crate::preprocess::{preprocess_dataset_with_seed, PreprocessedData};
use crate::profile::{profile_dataset, DatasetProfile};

/// Everything the trainer needs for one run.
#[derive(Debug, Clone)]
pub struct PreparedExperiment {
    pub request: ExperimentRunRequest,
    pub profile: DatasetProfile,
    pub estimate: RuntimeEstimate,
    pub data: PreprocessedData,
    /// Config applied during preprocessing, if the request carried one.
    pub column_config_used: Option<ColumnConfig>,
}

/// Validate a request and prepare its matrices.
///
/// The profile and estimate describe the full dataset, before any columns
/// are dropped.
pub fn prepare_experiment(
    table: &Table,
    request: &ExperimentRunRequest,
    seed: u64,
) -> Result<PreparedExperiment> {
    request.validate_against(table)?;

    let profile = profile_dataset(table);
    let estimate = estimate_runtime(&profile, &request.model_names);
    let data = preprocess_dataset_with_seed(
        table,
        &request.target_column,
        request.test_size,
        request.column_config.as_ref(),
        seed,
    )?;

    tracing::info!(
        dataset = %request.dataset_id,
        models = request.model_names.len(),
        estimate = %estimate.overall_estimate,
        "Prepared experiment"
    );

    Ok(PreparedExperiment {
        request: request.clone(),
        profile,
        estimate,
        data,
        column_config_used: request.column_config.clone(),
    })
}
