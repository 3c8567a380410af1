use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::ident::IdentifiedParameters;

use super::pid::ControllerParameters;

/// Recommended lower bound on lambda / theta for IMC tuning.
pub const IMC_LAMBDA_RATIO: f64 = 0.8;

// ---------------------------------------------------------------------------
// Tuning rules
// ---------------------------------------------------------------------------

/// PID tuning rule applied to an identified FOPDT model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum ControllerRule {
    /// Internal Model Control with closed-loop time constant `lambda`.
    Imc { lambda: f64 },
    /// Chien-Hrones-Reswick, set-point response without overshoot.
    Chr0,
}

impl ControllerRule {
    pub fn synthesize(&self, p: &IdentifiedParameters) -> Result<ControllerParameters> {
        match *self {
            Self::Imc { lambda } => imc(p.k, p.tau, p.theta, lambda),
            Self::Chr0 => chr0(p.k, p.tau, p.theta),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Imc { .. } => "IMC",
            Self::Chr0 => "CHR (0% overshoot)",
        }
    }
}

/// IMC-PID: kp = (2 tau + theta) / (k (2 lambda + theta)),
/// ti = tau + theta / 2, td = tau theta / (2 tau + theta).
pub fn imc(k: f64, tau: f64, theta: f64, lambda: f64) -> Result<ControllerParameters> {
    let denom = k * (2.0 * lambda + theta);
    if denom == 0.0 {
        return Err(Error::DivisionByZero("k * (2 lambda + theta) is zero"));
    }
    let lag = 2.0 * tau + theta;
    if lag == 0.0 {
        return Err(Error::DivisionByZero("2 tau + theta is zero"));
    }
    if theta > 0.0 && lambda / theta <= IMC_LAMBDA_RATIO {
        warn!(
            lambda,
            theta,
            ratio = lambda / theta,
            "IMC lambda/theta below recommended minimum of {}",
            IMC_LAMBDA_RATIO
        );
    }
    Ok(ControllerParameters {
        kp: lag / denom,
        ti: tau + theta / 2.0,
        td: tau * theta / lag,
    })
}

/// CHR 0% overshoot: kp = 0.95 tau / (k theta), ti = 2.4 tau, td = 0.42 tau.
pub fn chr0(k: f64, tau: f64, theta: f64) -> Result<ControllerParameters> {
    if k == 0.0 {
        return Err(Error::DivisionByZero("process gain k is zero"));
    }
    if theta == 0.0 {
        return Err(Error::DivisionByZero("dead time theta is zero"));
    }
    Ok(ControllerParameters {
        kp: 0.95 * tau / (k * theta),
        ti: 2.4 * tau,
        td: 0.42 * tau,
    })
}
