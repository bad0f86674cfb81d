use crate::{Accelerometer, DataPoint, InvalidInputError};

/// Euclidean norm of every reading. Output keeps the input order and length.
pub fn magnitudes(input: impl IntoIterator<Item = Accelerometer>) -> Vec<DataPoint> {
    input.into_iter().map(DataPoint::from).collect()
}

/// Subtract the signal-wide mean magnitude to remove the gravity/DC offset.
pub fn remove_mean(
    input: impl IntoIterator<Item = DataPoint>,
) -> Result<Vec<DataPoint>, InvalidInputError> {
    let input = input.into_iter().collect::<Vec<_>>();

    if input.is_empty() {
        return Err(InvalidInputError::EmptySignal);
    }

    let mean = input.iter().map(|this| this.magnitude).sum::<f64>() / input.len() as f64;

    Ok(input
        .into_iter()
        .map(|mut this| {
            this.magnitude -= mean;
            this
        })
        .collect())
}

/// Magnitude extraction followed by mean removal.
pub fn preprocess(
    input: impl IntoIterator<Item = Accelerometer>,
) -> Result<Vec<DataPoint>, InvalidInputError> {
    remove_mean(magnitudes(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn reading(index: u64, x: f64, y: f64, z: f64) -> Accelerometer {
        Accelerometer {
            timestamp: Duration::from_millis(20 * index),
            x,
            y,
            z,
        }
    }

    #[test]
    fn test_magnitude_length_and_sign() {
        let input = vec![
            reading(0, 3.0, 4.0, 0.0),
            reading(1, -1.0, -2.0, -2.0),
            reading(2, 0.0, 0.0, 0.0),
        ];

        let output = magnitudes(input);

        assert_eq!(output.len(), 3);
        assert!(output.iter().all(|this| this.magnitude >= 0.0));
        assert!((output[0].magnitude - 5.0).abs() < 1e-12);
        assert!((output[1].magnitude - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_remove_mean_centers_signal() {
        let input = vec![
            reading(0, 1.0, 0.0, 0.0),
            reading(1, 2.0, 0.0, 0.0),
            reading(2, 3.0, 0.0, 0.0),
        ];

        let output = preprocess(input).expect("input is not empty");

        let sum = output.iter().map(|this| this.magnitude).sum::<f64>();
        assert!(sum.abs() < 1e-12);
        assert!((output[0].magnitude - -1.0).abs() < 1e-12);
        assert!((output[2].magnitude - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(preprocess(vec![]), Err(InvalidInputError::EmptySignal));
        assert_eq!(remove_mean(vec![]), Err(InvalidInputError::EmptySignal));
    }
}
