//! Polynomial evaluation.

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...` with Horner's scheme.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
