//! Registry of the classifier families the trainer offers.

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A classifier family the downstream trainer can fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    GradientBoosting,
}

impl ModelKind {
    /// All registered models.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LogisticRegression,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    /// Registry name.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting",
        }
    }

    /// Relative training cost used by the runtime estimator.
    pub fn complexity_weight(&self) -> f64 {
        match self {
            ModelKind::LogisticRegression => 1.0,
            ModelKind::RandomForest => 3.0,
            ModelKind::GradientBoosting => 4.0,
        }
    }

    /// Comma-separated registry names, for error messages.
    pub fn available() -> String {
        Self::ALL.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for ModelKind {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| ForgeError::UnknownModel {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Complexity weight for a model name; unregistered names weigh 1.0.
pub fn complexity_weight(model_name: &str) -> f64 {
    model_name
        .parse::<ModelKind>()
        .map_or(1.0, |m| m.complexity_weight())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for model in ModelKind::ALL {
            assert_eq!(model.name().parse::<ModelKind>().unwrap(), model);
        }
    }

    #[test]
    fn test_unknown_model() {
        let err = "svm".parse::<ModelKind>().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("random_forest"));
    }

    #[test]
    fn test_weights() {
        assert_eq!(complexity_weight("logistic_regression"), 1.0);
        assert_eq!(complexity_weight("random_forest"), 3.0);
        assert_eq!(complexity_weight("gradient_boosting"), 4.0);
        assert_eq!(complexity_weight("something_else"), 1.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ModelKind::GradientBoosting).unwrap();
        assert_eq!(json, "\"gradient_boosting\"");
    }
}
