use crate::error::{Error, Result};

use super::transfer::TransferFunction;

/// Order of the delay approximation used everywhere in the pipeline.
pub const PADE_ORDER: usize = 5;

/// Order-5 Padé approximation of `exp(-theta s)`.
pub fn pade_delay(theta: f64) -> Result<TransferFunction> {
    pade_delay_order(theta, PADE_ORDER)
}

/// Diagonal Padé approximant of `exp(-theta s)` of the given order.
///
/// Coefficients follow the classical recurrence
/// `c_j = c_{j-1} * theta * (n - j + 1) / ((2n - j + 1) * j)`, with the
/// numerator term of degree j equal to `(-1)^j c_j` and the denominator term
/// `c_j`. The result is scaled to a monic denominator. `theta = 0` (or order
/// 0) gives the identity, as does a delay too short to register against
/// unit-scale coefficients (`theta * order < EPSILON`).
pub fn pade_delay_order(theta: f64, order: usize) -> Result<TransferFunction> {
    if !theta.is_finite() || theta < 0.0 {
        return Err(Error::InvalidModel(format!("dead time must be finite and >= 0, got {theta}")));
    }
    if order == 0 || theta * (order as f64) < f64::EPSILON {
        return Ok(TransferFunction::identity());
    }

    let n = order;
    // Index by degree first, reversed at the end.
    let mut num = vec![0.0; n + 1];
    let mut den = vec![0.0; n + 1];
    num[0] = 1.0;
    den[0] = 1.0;
    let mut c = 1.0;
    for j in 1..=n {
        c *= theta * (n - j + 1) as f64 / ((2 * n - j + 1) * j) as f64;
        den[j] = c;
        num[j] = if j % 2 == 0 { c } else { -c };
    }

    let lead = den[n];
    if !lead.is_normal() {
        return Err(Error::InvalidModel(format!(
            "order-{n} delay approximation underflows for theta = {theta}"
        )));
    }
    let num: Vec<f64> = num.iter().rev().map(|v| v / lead).collect();
    let den: Vec<f64> = den.iter().rev().map(|v| v / lead).collect();
    TransferFunction::new(num, den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Complex;

    fn assert_coeffs(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() <= 1e-9 * e.abs().max(1.0), "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn zero_delay_is_identity() {
        let p = pade_delay(0.0).unwrap();
        assert_eq!(p.num(), &[1.0]);
        assert_eq!(p.den(), &[1.0]);
    }

    #[test]
    fn order_five_unit_delay_coefficients() {
        let p = pade_delay(1.0).unwrap();
        assert_coeffs(p.den(), &[1.0, 30.0, 420.0, 3360.0, 15120.0, 30240.0]);
        assert_coeffs(p.num(), &[-1.0, 30.0, -420.0, 3360.0, -15120.0, 30240.0]);
    }

    #[test]
    fn first_order_pade() {
        // (1 - theta s / 2) / (1 + theta s / 2) -> monic: (-s + 2/theta) / (s + 2/theta)
        let p = pade_delay_order(0.5, 1).unwrap();
        assert_coeffs(p.num(), &[-1.0, 4.0]);
        assert_coeffs(p.den(), &[1.0, 4.0]);
    }

    #[test]
    fn delay_is_all_pass_with_unit_dc_gain() {
        let p = pade_delay(2.5).unwrap();
        assert!((p.dc_gain().unwrap() - 1.0).abs() < 1e-12);
        for w in [0.1, 1.0, 3.0, 20.0] {
            let g = p.eval(Complex::new(0.0, w));
            assert!((g.norm() - 1.0).abs() < 1e-9, "|G(j{w})| = {}", g.norm());
        }
    }

    #[test]
    fn phase_matches_delay_at_low_frequency() {
        let theta = 2.0;
        let w = 0.2;
        let g = pade_delay(theta).unwrap().eval(Complex::new(0.0, w));
        assert!((g.arg() + theta * w).abs() < 1e-9);
    }

    #[test]
    fn vanishing_delay_is_identity() {
        let p = pade_delay(1e-70).unwrap();
        assert_eq!(p, TransferFunction::identity());
    }

    #[test]
    fn small_delay_stays_finite() {
        let p = pade_delay(1e-6).unwrap();
        assert_eq!(p.den_degree(), PADE_ORDER);
        assert!(p.den().iter().chain(p.num()).all(|c| c.is_finite()));
        assert!((p.dc_gain().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn high_order_underflow_is_reported() {
        let r = pade_delay_order(1e-12, 40);
        assert!(matches!(r, Err(Error::InvalidModel(_))));
    }

    #[test]
    fn negative_delay_rejected() {
        assert!(matches!(pade_delay(-0.1), Err(Error::InvalidModel(_))));
    }
}
