//! Training runtime estimation from a dataset profile.
//!
//! Complexity of one model:
//!
//! ```text
//! C = log2(max(n_rows, 2)) * n_cols * (1 + missing_ratio) * weight(model)
//! ```
//!
//! Models train one after another, so the overall band comes from the most
//! expensive model rather than the sum.

use crate::models::complexity_weight;
use crate::profile::DatasetProfile;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Scores below this train in under a minute.
pub const LOW_COMPLEXITY_LIMIT: f64 = 100.0;
/// Scores below this (and at least the low limit) take a few minutes.
pub const MEDIUM_COMPLEXITY_LIMIT: f64 = 500.0;

/// Coarse runtime band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuntimeBand {
    #[serde(rename = "< 1 min")]
    UnderAMinute,
    #[serde(rename = "1-5 min")]
    FewMinutes,
    #[serde(rename = "5-15 min")]
    UpToQuarterHour,
}

impl RuntimeBand {
    /// Band for a complexity score.
    pub fn from_complexity(score: f64) -> Self {
        if score < LOW_COMPLEXITY_LIMIT {
            Self::UnderAMinute
        } else if score < MEDIUM_COMPLEXITY_LIMIT {
            Self::FewMinutes
        } else {
            Self::UpToQuarterHour
        }
    }

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderAMinute => "< 1 min",
            Self::FewMinutes => "1-5 min",
            Self::UpToQuarterHour => "5-15 min",
        }
    }
}

impl std::fmt::Display for RuntimeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimate for a single model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    /// Complexity score, rounded to 2 decimals.
    pub complexity_score: f64,
    pub estimated_runtime: RuntimeBand,
}

/// Per-model estimates in the order the models were requested.
///
/// Serializes as a map from model name to estimate. Inserting a name that is
/// already present replaces its estimate in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelEstimates {
    entries: Vec<(String, ModelEstimate)>,
}

impl ModelEstimates {
    pub fn insert(&mut self, model: String, estimate: ModelEstimate) {
        match self.entries.iter_mut().find(|(name, _)| *name == model) {
            Some(slot) => slot.1 = estimate,
            None => self.entries.push((model, estimate)),
        }
    }

    pub fn get(&self, model: &str) -> Option<&ModelEstimate> {
        self.entries.iter().find(|(name, _)| name == model).map(|(_, e)| e)
    }

    pub fn contains_key(&self, model: &str) -> bool {
        self.get(model).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Model names in request order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelEstimate)> {
        self.entries.iter().map(|(name, e)| (name.as_str(), e))
    }
}

impl std::ops::Index<&str> for ModelEstimates {
    type Output = ModelEstimate;

    fn index(&self, model: &str) -> &ModelEstimate {
        match self.get(model) {
            Some(estimate) => estimate,
            None => panic!("no estimate for model '{}'", model),
        }
    }
}

impl Serialize for ModelEstimates {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, estimate) in &self.entries {
            map.serialize_entry(name, estimate)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ModelEstimates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EstimatesVisitor;

        impl<'de> Visitor<'de> for EstimatesVisitor {
            type Value = ModelEstimates;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of model name to estimate")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ModelEstimates, A::Error> {
                let mut estimates = ModelEstimates::default();
                while let Some((name, estimate)) = access.next_entry::<String, ModelEstimate>()? {
                    estimates.insert(name, estimate);
                }
                Ok(estimates)
            }
        }

        deserializer.deserialize_map(EstimatesVisitor)
    }
}

/// Inputs that drove the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFactors {
    pub n_rows: usize,
    pub n_cols: usize,
    /// Missing cell ratio, rounded to 3 decimals.
    pub missing_ratio: f64,
}

/// Runtime estimate across the requested models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEstimate {
    pub overall_estimate: RuntimeBand,
    pub per_model: ModelEstimates,
    pub complexity_factors: ComplexityFactors,
}

impl std::fmt::Display for RuntimeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Runtime Estimate: {}", self.overall_estimate)?;
        writeln!(
            f,
            "  Factors: {} rows, {} cols, {:.1}% missing",
            self.complexity_factors.n_rows,
            self.complexity_factors.n_cols,
            self.complexity_factors.missing_ratio * 100.0
        )?;
        for (model, est) in self.per_model.iter() {
            writeln!(
                f,
                "  {:<22} score={:<10.2} {}",
                model, est.complexity_score, est.estimated_runtime
            )?;
        }
        Ok(())
    }
}

/// Complexity score of one model for a dataset shape.
pub fn complexity_score(n_rows: usize, n_cols: usize, missing_ratio: f64, model_name: &str) -> f64 {
    let rows = n_rows.max(2) as f64;
    rows.log2() * n_cols as f64 * (1.0 + missing_ratio) * complexity_weight(model_name)
}

/// Estimate runtime from a dataset profile.
pub fn estimate_runtime<S: AsRef<str>>(profile: &DatasetProfile, model_names: &[S]) -> RuntimeEstimate {
    estimate_from_counts(profile.n_rows, profile.n_cols, profile.missing_values, model_names)
}

/// Estimate runtime from raw dataset counts.
pub fn estimate_from_counts<S: AsRef<str>>(
    n_rows: usize,
    n_cols: usize,
    missing_values: usize,
    model_names: &[S],
) -> RuntimeEstimate {
    let total_cells = n_rows * n_cols;
    let missing_ratio = if total_cells > 0 {
        missing_values as f64 / total_cells as f64
    } else {
        0.0
    };

    let mut per_model = ModelEstimates::default();
    let mut max_complexity = 0.0_f64;
    for name in model_names {
        let name = name.as_ref();
        let score = complexity_score(n_rows, n_cols, missing_ratio, name);
        per_model.insert(
            name.to_string(),
            ModelEstimate {
                complexity_score: round_to(score, 2),
                estimated_runtime: RuntimeBand::from_complexity(score),
            },
        );
        max_complexity = max_complexity.max(score);
    }

    let overall_estimate = RuntimeBand::from_complexity(max_complexity);
    tracing::debug!(
        n_rows,
        n_cols,
        missing_ratio,
        max_complexity,
        band = %overall_estimate,
        "Estimated runtime"
    );

    RuntimeEstimate {
        overall_estimate,
        per_model,
        complexity_factors: ComplexityFactors {
            n_rows,
            n_cols,
            missing_ratio: round_to(missing_ratio, 3),
        },
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
