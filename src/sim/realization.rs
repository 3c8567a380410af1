use nalgebra::linalg::Schur;
use nalgebra::{Complex, DMatrix, DVector};

use crate::error::{Error, Result};
use crate::tf::TransferFunction;

/// Iteration cap for the Schur decomposition used to locate poles.
const MAX_SCHUR_ITERATIONS: usize = 10_000;

// ---------------------------------------------------------------------------
// Controllable canonical realization
// ---------------------------------------------------------------------------

/// `x' = A x + B u`, `y = C x + D u` for a proper SISO transfer function.
#[derive(Debug, Clone)]
pub struct StateSpace {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
    pub d: f64,
}

impl StateSpace {
    /// Controllable canonical form of `tf`.
    ///
    /// With the monic denominator `s^n + a1 s^(n-1) + ... + an` and the
    /// numerator padded to `b0 s^n + ... + bn`: the first row of A is
    /// `[-a1 .. -an]` with ones on the subdiagonal, B = e1,
    /// `C_i = b_i - b0 a_i` and D = b0.
    pub fn from_transfer_function(tf: &TransferFunction) -> Result<Self> {
        if !tf.is_proper() {
            return Err(Error::SimulationFailure(format!(
                "improper model (numerator degree {} > denominator degree {}) has no state realization",
                tf.num_degree(),
                tf.den_degree()
            )));
        }
        let den = tf.den();
        let n = tf.den_degree();
        let lead = den[0];

        let a_coef: Vec<f64> = den.iter().map(|v| v / lead).collect();
        let mut b_coef = vec![0.0; n + 1 - tf.num().len()];
        b_coef.extend(tf.num().iter().map(|v| v / lead));

        let d = b_coef[0];
        let mut a = DMatrix::zeros(n, n);
        for j in 0..n {
            a[(0, j)] = -a_coef[j + 1];
        }
        for i in 1..n {
            a[(i, i - 1)] = 1.0;
        }
        let mut b = DVector::zeros(n);
        if n > 0 {
            b[0] = 1.0;
        }
        let c = DVector::from_iterator(n, (1..=n).map(|i| b_coef[i] - d * a_coef[i]));

        let finite = a.iter().chain(c.iter()).all(|v| v.is_finite()) && d.is_finite();
        if !finite {
            return Err(Error::SimulationFailure(
                "realization has non-finite coefficients (ill-conditioned denominator)".into(),
            ));
        }
        Ok(Self { a, b, c, d })
    }

    pub fn order(&self) -> usize {
        self.b.len()
    }

    /// Eigenvalues of A, i.e. the model poles.
    pub fn poles(&self) -> Result<Vec<Complex<f64>>> {
        if self.order() == 0 {
            return Ok(Vec::new());
        }
        let schur = Schur::try_new(self.a.clone(), f64::EPSILON, MAX_SCHUR_ITERATIONS)
            .ok_or_else(|| Error::SimulationFailure("pole computation did not converge".into()))?;
        Ok(schur.complex_eigenvalues().iter().copied().collect())
    }

    pub fn output(&self, x: &DVector<f64>, u: f64) -> f64 {
        self.c.dot(x) + self.d * u
    }
}
