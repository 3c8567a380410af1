use std::fmt;

use nalgebra::Complex;
use serde::Serialize;

use crate::error::{Error, Result};

use super::poly;

// ---------------------------------------------------------------------------
// Rational transfer function
// ---------------------------------------------------------------------------

/// SISO transfer function `num(s) / den(s)`, coefficients highest degree first.
///
/// Instances are immutable: every operation below allocates a new value and
/// leaves its operands untouched. No pole-zero cancellation is ever done, so
/// composed degrees add up exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl TransferFunction {
    /// Build from raw coefficients. Leading zeros are trimmed.
    pub fn new(num: Vec<f64>, den: Vec<f64>) -> Result<Self> {
        if num.is_empty() || den.is_empty() {
            return Err(Error::InvalidModel("empty coefficient vector".into()));
        }
        if num.iter().chain(den.iter()).any(|c| !c.is_finite()) {
            return Err(Error::InvalidModel("non-finite coefficient".into()));
        }
        if poly::is_zero(&den) {
            return Err(Error::InvalidModel("denominator is identically zero".into()));
        }
        Ok(Self { num: poly::trim(&num), den: poly::trim(&den) })
    }

    /// The unit transfer function 1/1.
    pub fn identity() -> Self {
        Self { num: vec![1.0], den: vec![1.0] }
    }

    pub fn num(&self) -> &[f64] {
        &self.num
    }

    pub fn den(&self) -> &[f64] {
        &self.den
    }

    pub fn num_degree(&self) -> usize {
        self.num.len() - 1
    }

    pub fn den_degree(&self) -> usize {
        self.den.len() - 1
    }

    /// True when deg(num) <= deg(den), i.e. the model has a state realization.
    pub fn is_proper(&self) -> bool {
        self.num_degree() <= self.den_degree()
    }

    /// Frequency response at complex frequency `s`.
    pub fn eval(&self, s: Complex<f64>) -> Complex<f64> {
        poly::eval(&self.num, s) / poly::eval(&self.den, s)
    }

    /// Static gain G(0), `None` when the model has a pole at the origin.
    pub fn dc_gain(&self) -> Option<f64> {
        let d0 = self.den[self.den.len() - 1];
        if d0 == 0.0 {
            None
        } else {
            Some(self.num[self.num.len() - 1] / d0)
        }
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_poly(f: &mut fmt::Formatter<'_>, c: &[f64]) -> fmt::Result {
            let deg = c.len() - 1;
            let mut first = true;
            for (i, &v) in c.iter().enumerate() {
                if v == 0.0 && c.len() > 1 {
                    continue;
                }
                let p = deg - i;
                if !first {
                    f.write_str(if v < 0.0 { " - " } else { " + " })?;
                } else if v < 0.0 {
                    f.write_str("-")?;
                }
                first = false;
                let a = v.abs();
                match p {
                    0 => write!(f, "{a:.4}")?,
                    1 => write!(f, "{a:.4} s")?,
                    _ => write!(f, "{a:.4} s^{p}")?,
                }
            }
            if first {
                f.write_str("0")?;
            }
            Ok(())
        }
        f.write_str("(")?;
        write_poly(f, &self.num)?;
        f.write_str(") / (")?;
        write_poly(f, &self.den)?;
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Algebra
// ---------------------------------------------------------------------------

/// First-order lag `k / (tau s + 1)`.
pub fn first_order(k: f64, tau: f64) -> TransferFunction {
    TransferFunction { num: poly::trim(&[k]), den: poly::trim(&[tau, 1.0]) }
}

/// Cascade `a` then `b`: numerators and denominators multiply.
pub fn series(a: &TransferFunction, b: &TransferFunction) -> TransferFunction {
    TransferFunction {
        num: poly::trim(&poly::convolve(&a.num, &b.num)),
        den: poly::trim(&poly::convolve(&a.den, &b.den)),
    }
}

/// Close `a` in a unity negative-feedback loop: `num / (den + num)`.
pub fn unity_feedback(a: &TransferFunction) -> Result<TransferFunction> {
    let den = poly::add(&a.den, &a.num);
    if poly::is_zero(&den) {
        return Err(Error::InvalidModel(
            "closed-loop denominator is identically zero".into(),
        ));
    }
    Ok(TransferFunction { num: a.num.clone(), den: poly::trim(&den) })
}

/// Multiply the numerator by `factor`.
pub fn scale(a: &TransferFunction, factor: f64) -> TransferFunction {
    TransferFunction {
        num: poly::trim(&a.num.iter().map(|c| c * factor).collect::<Vec<_>>()),
        den: a.den.clone(),
    }
}
