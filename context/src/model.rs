use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use ndarray::{Array1, Array2, Ix1};

use signal::{DataPoint, FEATURE_NAMES, FeatureVector, FilterConfig, feature_windows};

use crate::TrainingError;

/// Capability set a context classifier has to provide. Any compliant model
/// substitutes without touching the pipeline.
pub trait ContextModel: Sized {
    fn fit(dataset: &Dataset<f64, usize, Ix1>) -> Result<Self, TrainingError>;

    fn predict(&self, records: &Array2<f64>) -> Array1<usize>;
}

impl ContextModel for linfa_trees::DecisionTree<f64, usize> {
    fn fit(dataset: &Dataset<f64, usize, Ix1>) -> Result<Self, TrainingError> {
        Self::params()
            .fit(dataset)
            .map_err(|e| TrainingError::Fit(e.to_string()))
    }

    fn predict(&self, records: &Array2<f64>) -> Array1<usize> {
        Predict::predict(self, records)
    }
}

/// A trained classifier together with the label table and the windowing and
/// filter configuration it was trained with.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TrainedContext<M> {
    /// Samples per feature window; inference always cuts windows of this size
    pub window_size: usize,
    /// Filter configuration the training signal was conditioned with
    pub filter: FilterConfig,
    labels: Vec<String>,
    model: M,
}

/// The default instantiation persisted by the `training` binary.
pub type SavedModel = TrainedContext<linfa_trees::DecisionTree<f64, usize>>;

impl<M: ContextModel> TrainedContext<M> {
    pub(crate) fn new(
        window_size: usize,
        filter: FilterConfig,
        labels: Vec<String>,
        model: M,
    ) -> Self {
        Self {
            window_size,
            filter,
            labels,
            model,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Cut windows with the stored window size and predict one context per
    /// window, in window order.
    pub fn classify(&self, input: &[DataPoint]) -> Result<Vec<&str>, signal::InvalidInputError> {
        let features = feature_windows(input, self.window_size)?.collect::<Vec<_>>();

        Ok(self.predict_features(&features))
    }

    /// Predict one context per feature vector.
    pub fn predict_features(&self, features: &[FeatureVector]) -> Vec<&str> {
        if features.is_empty() {
            return Vec::new();
        }

        self.model
            .predict(&records_from(features))
            .iter()
            .map(|class| {
                self.labels
                    .get(*class)
                    .map(String::as_str)
                    .expect("model predicts only trained classes")
            })
            .collect()
    }
}

pub(crate) fn records_from(features: &[FeatureVector]) -> Array2<f64> {
    let data = features
        .iter()
        .flat_map(|this| this.to_array())
        .collect::<Vec<_>>();

    Array2::from_shape_vec((features.len(), FEATURE_NAMES.len()), data)
        .expect("row length is fixed")
}

/// Majority context over a session's window labels. Ties go to the label
/// seen first; `None` on an empty session.
pub fn dominant_context<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for label in labels {
        match counts.iter_mut().find(|(this, _)| *this == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;

    for (label, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((label, count));
        }
    }

    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_context_majority() {
        let labels = ["walking", "jogging", "walking", "stairs", "walking"];

        assert_eq!(dominant_context(labels), Some("walking"));
    }

    #[test]
    fn test_dominant_context_tie_keeps_first_seen() {
        let labels = ["jogging", "walking", "walking", "jogging"];

        assert_eq!(dominant_context(labels), Some("jogging"));
    }

    #[test]
    fn test_dominant_context_empty() {
        assert_eq!(dominant_context([]), None);
    }
}
