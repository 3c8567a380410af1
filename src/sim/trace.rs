use serde::Serialize;

use crate::dataset::SampleSeries;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Time-domain trace
// ---------------------------------------------------------------------------

/// Ordered (time, value) samples of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResponseTrace {
    time: Vec<f64>,
    value: Vec<f64>,
}

impl StepResponseTrace {
    pub fn new(time: Vec<f64>, value: Vec<f64>) -> Result<Self> {
        if time.len() != value.len() {
            return Err(Error::ArityMismatch(format!(
                "trace has {} time stamps but {} values",
                time.len(),
                value.len()
            )));
        }
        Ok(Self { time, value })
    }

    /// Measured output of an experiment as a reference trace.
    pub fn from_series_output(series: &SampleSeries) -> Self {
        Self { time: series.time().to_vec(), value: series.output().to_vec() }
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.value.last().copied()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.value.iter().copied())
    }
}
