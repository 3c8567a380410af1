use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::SampleSeries;
use crate::error::{Error, Result};

use super::method::IdentificationMethod;

// ---------------------------------------------------------------------------
// Identified FOPDT parameters
// ---------------------------------------------------------------------------

/// Static gain, time constant and dead time of a FOPDT model
/// `k * exp(-theta * s) / (tau * s + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedParameters {
    pub k: f64,
    pub tau: f64,       // s, > 0
    pub theta: f64,     // s, >= 0
}

impl IdentifiedParameters {
    /// Checked constructor enforcing tau > 0 and theta >= 0.
    pub fn new(k: f64, tau: f64, theta: f64) -> Result<Self> {
        if !k.is_finite() || !tau.is_finite() || !theta.is_finite() {
            return Err(Error::InvalidModel(format!(
                "non-finite FOPDT parameters (k={k}, tau={tau}, theta={theta})"
            )));
        }
        if tau <= 0.0 {
            return Err(Error::InvalidModel(format!("time constant must be positive, got {tau}")));
        }
        if theta < 0.0 {
            return Err(Error::InvalidModel(format!("dead time must be non-negative, got {theta}")));
        }
        Ok(Self { k, tau, theta })
    }
}

// ---------------------------------------------------------------------------
// Threshold-crossing identification
// ---------------------------------------------------------------------------

/// Time of the first sample whose output is at or above `threshold`.
fn first_crossing(series: &SampleSeries, threshold: f64) -> Result<f64> {
    series
        .output()
        .iter()
        .position(|&y| y >= threshold)
        .map(|i| series.time()[i])
        .ok_or(Error::ThresholdNotReached { threshold })
}

/// Estimate (k, tau, theta) from a recorded step response, taking the mean
/// input as the step amplitude.
pub fn identify(series: &SampleSeries, method: IdentificationMethod) -> Result<IdentifiedParameters> {
    identify_with_amplitude(series, method, series.mean_input())
}

/// Same as [`identify`] with an explicit step amplitude for the gain.
pub fn identify_with_amplitude(
    series: &SampleSeries,
    method: IdentificationMethod,
    amplitude: f64,
) -> Result<IdentifiedParameters> {
    let final_value = series.final_value();
    let (f1, f2) = method.thresholds();
    let (y1, y2) = (f1 * final_value, f2 * final_value);

    let t1 = first_crossing(series, y1)?;
    let t2 = first_crossing(series, y2)?;
    let (tau, theta) = method.time_constants(t1, t2);

    if amplitude == 0.0 {
        return Err(Error::DivisionByZero("step amplitude is zero"));
    }
    let k = (final_value - series.output()[0]) / amplitude;

    debug!(%method, y1, y2, t1, t2, amplitude, k, tau, theta, "identified FOPDT model");
    IdentifiedParameters::new(k, tau, theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FopdtExperimentBuilder;

    /// Output ramps 0..10 over 0..10 s with a constant input of 2.
    fn ramp_series() -> SampleSeries {
        let time: Vec<f64> = (0..=100).map(|i| i as f64 * 0.1).collect();
        let output = time.clone();
        SampleSeries::new(time, vec![2.0; 101], output).unwrap()
    }

    #[test]
    fn smith_thresholds_and_estimates() {
        let s = ramp_series();
        let (f1, f2) = IdentificationMethod::Smith.thresholds();
        assert!((f1 * s.final_value() - 2.83).abs() < 1e-12);
        assert!((f2 * s.final_value() - 6.32).abs() < 1e-12);

        // First samples at or above 2.83 and 6.32 are t = 2.9 and t = 6.4.
        let p = identify(&s, IdentificationMethod::Smith).unwrap();
        let tau = 1.5 * (6.4 - 2.9);
        assert!((p.tau - tau).abs() < 1e-9, "tau = {}", p.tau);
        assert!((p.theta - (6.4 - tau)).abs() < 1e-9, "theta = {}", p.theta);
        assert!((p.k - 5.0).abs() < 1e-12);
    }

    #[test]
    fn sundaresan_estimates() {
        let s = ramp_series();
        // Thresholds 3.53 and 8.53 -> t1 = 3.6, t2 = 8.6.
        let p = identify(&s, IdentificationMethod::Sundaresan).unwrap();
        assert!((p.tau - (2.0 / 3.0) * 5.0).abs() < 1e-9);
        assert!((p.theta - (1.3 * 3.6 - 0.29 * 8.6)).abs() < 1e-9);
    }

    #[test]
    fn smith_recovers_known_plant() {
        let s = FopdtExperimentBuilder::new(2.0, 5.0, 1.0)
            .amplitude(1.5)
            .dt(0.001)
            .duration(100.0)
            .build()
            .sample()
            .unwrap();
        let p = identify(&s, IdentificationMethod::Smith).unwrap();
        assert!((p.k - 2.0).abs() < 1e-6, "k = {}", p.k);
        assert!((p.tau - 5.0).abs() < 0.02, "tau = {}", p.tau);
        assert!((p.theta - 1.0).abs() < 0.02, "theta = {}", p.theta);
    }

    #[test]
    fn sundaresan_recovers_known_plant() {
        let s = FopdtExperimentBuilder::new(2.0, 5.0, 1.0)
            .dt(0.001)
            .duration(100.0)
            .build()
            .sample()
            .unwrap();
        let p = identify(&s, IdentificationMethod::Sundaresan).unwrap();
        assert!((p.k - 2.0).abs() < 1e-6);
        assert!((p.tau - 5.0).abs() < 0.1, "tau = {}", p.tau);
        assert!((p.theta - 1.0).abs() < 0.1, "theta = {}", p.theta);
    }

    #[test]
    fn zero_mean_input_is_division_by_zero() {
        let time: Vec<f64> = (0..=10).map(f64::from).collect();
        let input = vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 0.0];
        let s = SampleSeries::new(time.clone(), input, time).unwrap();
        let err = identify(&s, IdentificationMethod::Smith).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero(_)));
    }

    #[test]
    fn explicit_amplitude_sets_gain() {
        let s = ramp_series();
        let p = identify_with_amplitude(&s, IdentificationMethod::Smith, 4.0).unwrap();
        let q = identify(&s, IdentificationMethod::Smith).unwrap();
        assert!((p.k - 2.5).abs() < 1e-12);
        assert_eq!((p.tau, p.theta), (q.tau, q.theta));
        let err = identify_with_amplitude(&s, IdentificationMethod::Smith, 0.0).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero(_)));
    }

    #[test]
    fn threshold_never_reached() {
        // Final value -10 puts y1 at -2.83, above every sample.
        let s = SampleSeries::new(vec![0.0, 1.0, 2.0], vec![1.0; 3], vec![-20.0, -20.0, -10.0])
            .unwrap();
        let err = identify(&s, IdentificationMethod::Smith).unwrap_err();
        assert!(matches!(err, Error::ThresholdNotReached { .. }));
    }

    #[test]
    fn same_sample_crossing_is_invalid_model() {
        let s = SampleSeries::new(vec![0.0, 1.0, 2.0], vec![1.0; 3], vec![0.0, 10.0, 10.0])
            .unwrap();
        let err = identify(&s, IdentificationMethod::Smith).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
    }
}
