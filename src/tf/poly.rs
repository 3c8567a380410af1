//! Coefficient-vector helpers. Polynomials are stored highest degree first.

use nalgebra::Complex;

/// Product of two polynomials.
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Sum of two polynomials, aligned at the constant term.
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    let mut out = vec![0.0; n];
    for (dst, &v) in out[n - a.len()..].iter_mut().zip(a) {
        *dst += v;
    }
    for (dst, &v) in out[n - b.len()..].iter_mut().zip(b) {
        *dst += v;
    }
    out
}

/// Drop leading zero coefficients, keeping at least one entry.
pub fn trim(coeffs: &[f64]) -> Vec<f64> {
    match coeffs.iter().position(|&c| c != 0.0) {
        Some(i) => coeffs[i..].to_vec(),
        None => vec![0.0],
    }
}

pub fn is_zero(coeffs: &[f64]) -> bool {
    coeffs.iter().all(|&c| c == 0.0)
}

/// Horner evaluation at a complex point.
pub fn eval(coeffs: &[f64], s: Complex<f64>) -> Complex<f64> {
    coeffs
        .iter()
        .fold(Complex::new(0.0, 0.0), |acc, &c| acc * s + Complex::new(c, 0.0))
}
