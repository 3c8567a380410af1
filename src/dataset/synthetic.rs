use crate::error::{Error, Result};

use super::series::SampleSeries;

// ---------------------------------------------------------------------------
// Analytic FOPDT experiment
// ---------------------------------------------------------------------------

/// Ideal first-order-plus-dead-time plant driven by a constant input step
/// applied at t = 0:
///
///   y(t) = y0                                  for t < theta
///   y(t) = y0 + k * A * (1 - exp(-(t - theta) / tau))   otherwise
#[derive(Debug, Clone)]
pub struct FopdtExperiment {
    pub k: f64,
    pub tau: f64,           // s
    pub theta: f64,         // s
    pub amplitude: f64,     // input step height
    pub baseline: f64,      // output before the step
    pub dt: f64,            // sample period, s
    pub duration: f64,      // s
}

impl FopdtExperiment {
    /// Noise-free output at time `t`.
    pub fn output_at(&self, t: f64) -> f64 {
        if t < self.theta {
            self.baseline
        } else {
            self.baseline + self.k * self.amplitude * (1.0 - (-(t - self.theta) / self.tau).exp())
        }
    }

    /// Sample the experiment on a uniform grid from 0 to `duration`.
    pub fn sample(&self) -> Result<SampleSeries> {
        if !(self.dt > 0.0) || !(self.duration > 0.0) {
            return Err(Error::InputValidation(
                "experiment needs a positive sample period and duration".into(),
            ));
        }
        if !(self.tau > 0.0) || self.theta < 0.0 {
            return Err(Error::InputValidation(
                "experiment needs tau > 0 and theta >= 0".into(),
            ));
        }
        let n = (self.duration / self.dt).round() as usize + 1;
        let time: Vec<f64> = (0..n).map(|i| i as f64 * self.dt).collect();
        let output = time.iter().map(|&t| self.output_at(t)).collect();
        SampleSeries::new(time, vec![self.amplitude; n], output)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct FopdtExperimentBuilder {
    experiment: FopdtExperiment,
}

impl FopdtExperimentBuilder {
    pub fn new(k: f64, tau: f64, theta: f64) -> Self {
        Self {
            experiment: FopdtExperiment {
                k,
                tau,
                theta,
                amplitude: 1.0,
                baseline: 0.0,
                dt: 0.01,
                duration: 10.0 * tau + theta,
            },
        }
    }

    pub fn amplitude(mut self, v: f64) -> Self { self.experiment.amplitude = v; self }
    pub fn baseline(mut self, v: f64) -> Self { self.experiment.baseline = v; self }
    pub fn dt(mut self, v: f64) -> Self { self.experiment.dt = v; self }
    pub fn duration(mut self, v: f64) -> Self { self.experiment.duration = v; self }

    pub fn build(self) -> FopdtExperiment {
        self.experiment
    }
}
