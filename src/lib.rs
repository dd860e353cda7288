//! Baseline Classification Core
//!
//! Building blocks for turning a tabular dataset into a baseline
//! classification experiment.
//!
//! # Overview
//!
//! - **data**: Tables, column configs and the train/test feature matrices
//! - **profile**: Dataset profiling and column-role suggestions
//! - **preprocess**: Stratified split, imputation, scaling and encoding
//! - **estimate**: Advisory training runtime estimates
//! - **models**: Registry of the classifier families
//! - **experiment**: Run requests, artifact hand-off and the leaderboard
//! - **config**: Settings for the `forge` tool
//!
//! # Example
//!
//! ```no_run
//! use forge_baselines::prelude::*;
//!
//! let table = Table::from_csv("iris.csv").unwrap();
//! let profile = profile_dataset(&table);
//!
//! // Drop columns that look like identifiers or free text
//! let suggestion = suggest_column_config(&profile, "Species");
//!
//! let request = ExperimentRunRequest::new("iris", "Species", &["random_forest"])
//!     .with_column_config(suggestion.column_config);
//! let prepared = prepare_experiment(&table, &request, DEFAULT_SPLIT_SEED).unwrap();
//! println!("{}", prepared.estimate);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod estimate;
pub mod experiment;
pub mod models;
pub mod preprocess;
pub mod profile;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::data::{
        Cell, Column, ColumnConfig, ColumnKind, ConfigSource, FeatureMatrixPair, Table,
    };
    pub use crate::error::{ForgeError, Result};
    pub use crate::estimate::{estimate_runtime, RuntimeBand, RuntimeEstimate};
    pub use crate::experiment::{
        evaluate, prepare_experiment, read_feature_matrices, write_experiment, ArtifactPaths,
        ExperimentRunRequest, Leaderboard, ModelMetrics, ModelResult, PreparedExperiment,
    };
    pub use crate::models::ModelKind;
    pub use crate::preprocess::{
        preprocess_dataset, preprocess_dataset_with_seed, FittedTransform, PreprocessedData,
        DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION,
    };
    pub use crate::profile::{
        profile_dataset, suggest_column_config, ColumnSuggestion, DatasetProfile,
    };
}
