use serde::Serialize;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Recorded step-response experiment
// ---------------------------------------------------------------------------

/// One recorded step-response experiment: sample time, applied input and
/// measured output, all of equal length.
///
/// Built only through [`SampleSeries::new`], so every instance has at least
/// two samples, finite values and strictly increasing time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSeries {
    time: Vec<f64>,
    input: Vec<f64>,
    output: Vec<f64>,
}

impl SampleSeries {
    pub fn new(time: Vec<f64>, input: Vec<f64>, output: Vec<f64>) -> Result<Self> {
        if time.len() != input.len() || time.len() != output.len() {
            return Err(Error::InputValidation(format!(
                "series lengths differ (time {}, input {}, output {})",
                time.len(),
                input.len(),
                output.len()
            )));
        }
        if time.len() < 2 {
            return Err(Error::InputValidation(format!(
                "series needs at least 2 samples, got {}",
                time.len()
            )));
        }
        let all_finite = time
            .iter()
            .chain(input.iter())
            .chain(output.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::InputValidation("series contains non-finite values".into()));
        }
        if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::InputValidation(format!(
                "time is not strictly increasing at sample {} ({} -> {})",
                i + 1,
                time[i],
                time[i + 1]
            )));
        }
        Ok(Self { time, input, output })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always false: construction rejects series shorter than two samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Output value at the last sample, taken as the steady-state response.
    pub fn final_value(&self) -> f64 {
        self.output[self.output.len() - 1]
    }

    /// Mean of the input signal, used as the experimental step amplitude.
    pub fn mean_input(&self) -> f64 {
        self.input.iter().sum::<f64>() / self.input.len() as f64
    }

    pub fn duration(&self) -> f64 {
        self.time[self.time.len() - 1] - self.time[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_series() {
        let s = SampleSeries::new(vec![0.0, 1.0, 2.0], vec![2.0; 3], vec![0.0, 1.0, 4.0]).unwrap();
        assert_eq!(s.len(), 3);
        assert!((s.final_value() - 4.0).abs() < 1e-12);
        assert!((s.mean_input() - 2.0).abs() < 1e-12);
        assert!((s.duration() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = SampleSeries::new(vec![0.0, 1.0], vec![1.0], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
    }

    #[test]
    fn rejects_single_sample() {
        let err = SampleSeries::new(vec![0.0], vec![1.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
    }

    #[test]
    fn rejects_non_increasing_time() {
        let err = SampleSeries::new(vec![0.0, 1.0, 1.0], vec![1.0; 3], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
    }

    #[test]
    fn rejects_nan() {
        let err =
            SampleSeries::new(vec![0.0, 1.0], vec![1.0, 1.0], vec![0.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
    }
}
