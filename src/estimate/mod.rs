//! Advisory training runtime estimates.

mod runtime;

pub use runtime::{
    complexity_score, estimate_from_counts, estimate_runtime, ComplexityFactors, ModelEstimate,
    ModelEstimates, RuntimeBand, RuntimeEstimate, LOW_COMPLEXITY_LIMIT, MEDIUM_COMPLEXITY_LIMIT,
};
