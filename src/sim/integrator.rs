use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

use super::realization::StateSpace;

// ---------------------------------------------------------------------------
// Exact zero-order-hold step for a piecewise-constant input
// ---------------------------------------------------------------------------

/// Discrete transition over one interval `h`:
/// `x[k+1] = phi x[k] + gamma u[k]`.
#[derive(Debug, Clone)]
pub struct ZohStep {
    pub h: f64,
    pub phi: DMatrix<f64>,
    pub gamma: DVector<f64>,
}

impl ZohStep {
    /// `exp([[A, B], [0, 0]] h)` holds phi in its top-left block and gamma in
    /// its last column.
    pub fn new(ss: &StateSpace, h: f64) -> Result<Self> {
        let n = ss.order();
        let mut m = DMatrix::zeros(n + 1, n + 1);
        m.view_mut((0, 0), (n, n)).copy_from(&(&ss.a * h));
        m.view_mut((0, n), (n, 1)).copy_from(&(&ss.b * h));
        let e = m.exp();

        let phi = e.view((0, 0), (n, n)).clone_owned();
        let gamma = DVector::from_iterator(n, (0..n).map(|i| e[(i, n)]));
        if !phi.iter().chain(gamma.iter()).all(|v| v.is_finite()) {
            return Err(Error::SimulationFailure(format!(
                "discretization over h = {h} overflowed"
            )));
        }
        Ok(Self { h, phi, gamma })
    }

    /// Whether this step can be reused for an interval of length `h`.
    pub fn matches(&self, h: f64) -> bool {
        (self.h - h).abs() <= 1e-9 * self.h
    }

    pub fn advance(&self, x: &DVector<f64>, u: f64) -> DVector<f64> {
        &self.phi * x + &self.gamma * u
    }
}
