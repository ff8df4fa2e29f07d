//! Scalar root finding: grid bracketing plus Brent refinement.

/// Brent's method on a bracketing interval [a, b].
///
/// Returns `None` if `f(a)` and `f(b)` share a sign or the iteration
/// budget is exhausted before the bracket shrinks below `tol`.
pub fn brent<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, tol: f64, max_iter: usize) -> Option<f64> {
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);
    if !fa.is_finite() || !fb.is_finite() {
        return None;
    }
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa.signum() == fb.signum() {
        return None;
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iter {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let m = 0.5 * (c - b);
        if m.abs() <= tol1 || fb == 0.0 {
            return Some(b);
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Inverse quadratic interpolation (secant when a == c)
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * m * s, 1.0 - s)
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * m * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            if 2.0 * p < (3.0 * m * q - (tol1 * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = m;
            }
        } else {
            d = m;
            e = m;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(m) };
        fb = f(b);
        if !fb.is_finite() {
            return None;
        }
    }
    None
}

/// Indices `i` where `values[i]` and `values[i + 1]` are finite with
/// opposite signs (or `values[i]` is exactly zero).
pub fn sign_change_brackets(values: &[f64]) -> Vec<usize> {
    let mut brackets = Vec::new();
    for i in 0..values.len().saturating_sub(1) {
        let (v0, v1) = (values[i], values[i + 1]);
        if !v0.is_finite() || !v1.is_finite() {
            continue;
        }
        if v0 == 0.0 || v0.signum() != v1.signum() {
            brackets.push(i);
        }
    }
    brackets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brent_cubic() {
        let root = brent(|x| x * x * x - 2.0 * x - 5.0, 2.0, 3.0, 1e-14, 100).unwrap();
        assert!((root - 2.0945514815423265).abs() < 1e-12);
    }

    #[test]
    fn test_brent_rejects_non_bracket() {
        assert!(brent(|x| x * x + 1.0, -1.0, 1.0, 1e-12, 100).is_none());
    }

    #[test]
    fn test_brackets_found() {
        let xs: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
        let vals: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        // sin has roots at pi, 2 pi, 3 pi within [0.1, 9.9]; x = 0 is an exact zero
        let b = sign_change_brackets(&vals);
        assert_eq!(b.len(), 4);
        assert_eq!(b[0], 0);
        assert!(xs[b[1]] < std::f64::consts::PI && xs[b[1] + 1] > std::f64::consts::PI);
    }
}
