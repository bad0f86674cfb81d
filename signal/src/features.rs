use crate::{DataPoint, InvalidInputError};

pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Feature order matches [`FeatureVector::to_array`].
pub const FEATURE_NAMES: [&str; 6] = ["mean", "std", "max", "min", "q25", "q75"];

/// Summary statistics of one window of the filtered magnitude signal.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureVector {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub max: f64,
    pub min: f64,
    /// 25th percentile, linearly interpolated
    pub q25: f64,
    /// 75th percentile, linearly interpolated
    pub q75: f64,
}

impl FeatureVector {
    pub const fn to_array(self) -> [f64; 6] {
        [self.mean, self.std, self.max, self.min, self.q25, self.q75]
    }
}

/// Slice `signal` into non-overlapping windows of `window_size` samples and
/// compute one [`FeatureVector`] per window, in window order.
///
/// Trailing samples that do not fill a complete window are discarded, so a
/// signal of length `L` yields exactly `L / window_size` vectors. The
/// returned iterator borrows the signal and can be recreated at will.
pub fn feature_windows(
    signal: &[DataPoint],
    window_size: usize,
) -> Result<impl Iterator<Item = FeatureVector> + '_, InvalidInputError> {
    if window_size == 0 {
        return Err(InvalidInputError::ZeroWindow);
    }

    Ok(signal.chunks_exact(window_size).map(from_window))
}

fn from_window(window: &[DataPoint]) -> FeatureVector {
    let length = window.len() as f64;

    let mean = window.iter().map(|this| this.magnitude).sum::<f64>() / length;

    let std = (window
        .iter()
        .map(|this| (this.magnitude - mean).powi(2))
        .sum::<f64>()
        / length)
        .sqrt();

    let mut sorted = window.iter().map(|this| this.magnitude).collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    FeatureVector {
        mean,
        std,
        max: sorted.last().copied().expect("window is not empty"),
        min: sorted.first().copied().expect("window is not empty"),
        q25: percentile(&sorted, 0.25),
        q75: percentile(&sorted, 0.75),
    }
}

fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let position = fraction * (sorted.len() - 1) as f64;
    let index = position.floor() as usize;
    let remainder = position - index as f64;

    match sorted.get(index + 1) {
        Some(upper) => sorted[index] + (upper - sorted[index]) * remainder,
        None => sorted[index],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn signal(magnitudes: impl IntoIterator<Item = f64>) -> Vec<DataPoint> {
        magnitudes
            .into_iter()
            .enumerate()
            .map(|(i, magnitude)| DataPoint {
                magnitude,
                timestamp: Duration::from_millis(20 * i as u64),
            })
            .collect()
    }

    #[test]
    fn test_window_count_discards_trailer() {
        let input = signal((0..120).map(|i| i as f64));

        let windows = feature_windows(&input, 50)
            .expect("window size is non-zero")
            .collect::<Vec<_>>();

        assert_eq!(windows.len(), 2);
        assert!((windows[0].mean - 24.5).abs() < 1e-12);
        assert!((windows[1].mean - 74.5).abs() < 1e-12);
    }

    #[test]
    fn test_restartable() {
        let input = signal((0..100).map(|i| (i as f64).sin()));

        let first = feature_windows(&input, 25)
            .expect("window size is non-zero")
            .collect::<Vec<_>>();
        let second = feature_windows(&input, 25)
            .expect("window size is non-zero")
            .collect::<Vec<_>>();

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_known_statistics() {
        let input = signal([1.0, 2.0, 3.0, 4.0]);

        let window = feature_windows(&input, 4)
            .expect("window size is non-zero")
            .next()
            .expect("one full window");

        assert!((window.mean - 2.5).abs() < 1e-12);
        assert!((window.std - 1.25_f64.sqrt()).abs() < 1e-12);
        assert!((window.max - 4.0).abs() < 1e-12);
        assert!((window.min - 1.0).abs() < 1e-12);
        assert!((window.q25 - 1.75).abs() < 1e-12);
        assert!((window.q75 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_window_size() {
        let input = signal([1.0, 2.0]);

        assert!(matches!(
            feature_windows(&input, 0),
            Err(InvalidInputError::ZeroWindow)
        ));
    }
}
