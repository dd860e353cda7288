//! Dataset profiling and column-role suggestions.

mod dataset;
mod suggest;

pub use dataset::{profile_dataset, DatasetProfile};
pub use suggest::{
    classify_column, suggest_column_config, ColumnRole, ColumnSuggestion, HIGH_CARDINALITY_RATIO,
};
