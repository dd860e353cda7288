//! Preprocessing: turn a table into numeric train/test matrices.

pub mod encode;
pub mod impute;
pub mod pipeline;
pub mod scale;
pub mod split;

pub use encode::{LabelEncoder, OneHotEncoder};
pub use impute::{median, MedianImputer, MostFrequentImputer};
pub use pipeline::{
    apply_column_config, preprocess_dataset, preprocess_dataset_with_seed, CategoricalStep,
    FittedTransform, NumericStep, PreprocessedData, DEFAULT_TEST_FRACTION,
};
pub use scale::StandardScaler;
pub use split::{stratified_split, StratifiedSplit, DEFAULT_SPLIT_SEED};
