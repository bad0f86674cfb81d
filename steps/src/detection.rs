use crate::{ContextParams, PeakParams};

/// Count steps in a filtered magnitude signal under the thresholds selected
/// for `context`.
///
/// Greedy left-to-right scan: a sample is accepted when it is an interior
/// local maximum above `height` and lies at least `distance` samples after
/// the previously accepted peak. On a plateau of equal maxima the first
/// sample in sequence order is the candidate.
pub fn count_steps(
    signal: impl IntoIterator<Item = f64>,
    context: &str,
    params: &ContextParams,
) -> usize {
    let PeakParams { height, distance } = params.get(context);

    let signal = signal.into_iter().collect::<Vec<_>>();

    let mut last_accepted = None;

    (1..signal.len().saturating_sub(1))
        .filter_map(|index| {
            let is_peak = signal[index] > height
                && signal[index] > signal[index - 1]
                && signal[index] >= signal[index + 1];

            if !is_peak {
                return None;
            }

            match last_accepted {
                Some(last) if index - last < distance => None,
                _ => {
                    last_accepted = Some(index);
                    Some(index)
                }
            }
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::DEFAULT_PARAMS;

    fn spiked(length: usize, peaks: &[usize], height: f64) -> Vec<f64> {
        let mut signal = vec![0.0; length];
        for &peak in peaks {
            signal[peak] = height;
        }
        signal
    }

    #[test]
    fn test_counts_separated_peaks() {
        let signal = spiked(150, &[10, 50, 90, 130], 0.6);

        assert_eq!(count_steps(signal, "walking", &ContextParams::new()), 4);
    }

    #[test]
    fn test_distance_suppresses_close_peaks() {
        let signal = spiked(150, &[10, 50, 90, 130], 0.6);
        let params = ContextParams::new().with_context(
            "walking",
            PeakParams {
                height: 0.5,
                distance: 45,
            },
        );

        // 50 and 130 sit within 45 samples of an accepted peak
        assert_eq!(count_steps(signal, "walking", &params), 2);
    }

    #[test]
    fn test_unknown_context_matches_explicit_default() {
        let signal = spiked(150, &[10, 50, 90, 130], 0.6);

        let fallback = count_steps(signal.clone(), "skipping", &ContextParams::new());
        let explicit = count_steps(
            signal,
            "skipping",
            &ContextParams::empty().with_context("skipping", DEFAULT_PARAMS),
        );

        assert_eq!(fallback, explicit);
        assert_eq!(fallback, 4);
    }

    #[test]
    fn test_plateau_accepts_first_sample() {
        let signal = vec![0.0, 0.7, 0.7, 0.0, 0.0];

        assert_eq!(count_steps(signal, "walking", &ContextParams::new()), 1);
    }

    #[test]
    fn test_below_threshold() {
        let signal = spiked(100, &[20, 60], 0.4);

        assert_eq!(count_steps(signal, "walking", &ContextParams::new()), 0);
    }

    #[test]
    fn test_short_input() {
        assert_eq!(count_steps(vec![], "walking", &ContextParams::new()), 0);
        assert_eq!(count_steps(vec![1.0], "walking", &ContextParams::new()), 0);
        assert_eq!(count_steps(vec![1.0, 2.0], "walking", &ContextParams::new()), 0);
    }
}
