use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tf::TransferFunction;

// ---------------------------------------------------------------------------
// Ideal PID controller (parallel-in-time-constants form)
// ---------------------------------------------------------------------------

/// `C(s) = kp * (1 + 1/(ti s) + td s)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerParameters {
    pub kp: f64,
    pub ti: f64,    // integral time, s
    pub td: f64,    // derivative time, s
}

impl ControllerParameters {
    pub fn new(kp: f64, ti: f64, td: f64) -> Self {
        Self { kp, ti, td }
    }

    /// Equivalent parallel gains (kp, ki, kd).
    pub fn parallel_gains(&self) -> (f64, f64, f64) {
        (self.kp, self.kp / self.ti, self.kp * self.td)
    }

    pub fn transfer_function(&self) -> Result<TransferFunction> {
        build_pid(self.kp, self.ti, self.td)
    }
}

/// `[kp*td, kp, kp/ti] / [1, 0]`: one pole at the origin, improper on its own.
pub fn build_pid(kp: f64, ti: f64, td: f64) -> Result<TransferFunction> {
    if ti == 0.0 {
        return Err(Error::DivisionByZero("integral time ti is zero"));
    }
    TransferFunction::new(vec![kp * td, kp, kp / ti], vec![1.0, 0.0])
}
