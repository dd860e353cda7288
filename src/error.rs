//! Error types for the forge-baselines library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Invalid column config: {0}")]
    InvalidColumnConfig(String),

    #[error("Unknown model '{name}'. Available: {available}")]
    UnknownModel { name: String, available: String },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Stratified split not possible: {0}")]
    InfeasibleSplit(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForgeError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ForgeError::MissingColumn(_)
                | ForgeError::InvalidColumnConfig(_)
                | ForgeError::UnknownModel { .. }
                | ForgeError::InvalidParameter(_)
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
