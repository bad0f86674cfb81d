use linfa::Dataset;
use ndarray::Array1;
use rand::{SeedableRng, rngs::StdRng};

use signal::{DEFAULT_WINDOW_SIZE, FEATURE_NAMES, FeatureVector, FilterConfig, InvalidInputError};

use crate::{
    ConfusionMatrix, ContextModel, InsufficientDataError, TrainedContext, TrainingError,
    records_from,
};

/// Options for one training run.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct TrainOptions {
    /// Fraction of the labeled windows held out for evaluation
    pub holdout: f64,
    /// Seed for the shuffle in front of the holdout split
    pub seed: u64,
    /// Samples per feature window; carried into the trained model
    pub window_size: usize,
    /// Filter configuration the signal was conditioned with; carried into
    /// the trained model
    pub filter: FilterConfig,
}

impl TrainOptions {
    pub const fn new() -> Self {
        Self {
            holdout: 0.3,
            seed: 42,
            window_size: DEFAULT_WINDOW_SIZE,
            filter: FilterConfig::new(),
        }
    }

    pub const fn set_holdout(mut self, holdout: f64) -> Self {
        self.holdout = holdout;
        self
    }

    pub const fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub const fn set_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Train `M` on labeled feature vectors and evaluate it on a seeded holdout
/// split. Same input and same seed produce the identical split, model and
/// metrics.
pub fn train<M: ContextModel>(
    data: impl IntoIterator<Item = (FeatureVector, String)>,
    options: &TrainOptions,
) -> Result<(TrainedContext<M>, ConfusionMatrix), TrainingError> {
    if !(options.holdout > 0.0 && options.holdout < 1.0) {
        return Err(TrainingError::InvalidHoldout(options.holdout));
    }

    if options.window_size == 0 {
        return Err(InvalidInputError::ZeroWindow.into());
    }

    let data = data.into_iter().collect::<Vec<_>>();

    let mut labels = data
        .iter()
        .map(|(_, label)| label.clone())
        .collect::<Vec<_>>();
    labels.sort();
    labels.dedup();

    if labels.len() < 2 {
        return Err(InsufficientDataError {
            found: labels.len(),
        }
        .into());
    }

    let features = data.iter().map(|(this, _)| *this).collect::<Vec<_>>();

    let targets = data
        .iter()
        .map(|(_, label)| {
            labels
                .binary_search(label)
                .expect("label table was built from this data")
        })
        .collect::<Array1<_>>();

    let dataset = Dataset::new(records_from(&features), targets)
        .with_feature_names(FEATURE_NAMES.to_vec());

    let mut rng = StdRng::seed_from_u64(options.seed);
    let (train, valid) = dataset
        .shuffle(&mut rng)
        .split_with_ratio(1.0 - options.holdout as f32);

    let model = M::fit(&train)?;

    let predicted = model.predict(&valid.records);
    let confusion = ConfusionMatrix::from_pairs(
        labels.clone(),
        valid.targets.iter().copied().zip(predicted.iter().copied()),
    );

    Ok((
        TrainedContext::new(options.window_size, options.filter, labels, model),
        confusion,
    ))
}
