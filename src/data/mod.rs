//! Core data structures: tables, column configs and feature matrices.

mod column_config;
mod feature_matrix;
mod table;

pub use column_config::{ColumnConfig, ConfigSource};
pub use feature_matrix::FeatureMatrixPair;
pub use table::{Cell, Column, ColumnData, ColumnKind, Table};
