//! Activity-context classification over windowed signal features.
//!
//! The classifier capability set is a trait, so any fit/predict model can
//! back the pipeline; the provided implementation is the decision tree from
//! `linfa-trees`. A trained model carries the window size and filter
//! configuration it was trained with, so inference can never desynchronize
//! from training.

mod metrics;
#[cfg(feature = "ml")]
mod model;
#[cfg(feature = "binary")]
pub mod sessions;
#[cfg(feature = "ml")]
mod training;

pub use metrics::*;
#[cfg(feature = "ml")]
pub use model::*;
#[cfg(feature = "ml")]
pub use training::*;

/// Training data has to hold at least two distinct contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("training data holds {found} distinct context(s), need at least 2")]
pub struct InsufficientDataError {
    pub found: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),
    #[error(transparent)]
    InvalidInput(#[from] signal::InvalidInputError),
    #[error("holdout fraction {0} is outside (0, 1)")]
    InvalidHoldout(f64),
    #[error("failed to fit model: {0}")]
    Fit(String),
}
