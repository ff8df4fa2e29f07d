//! Piecewise-linear interpolation on tabulated data.
//!
//! Used for sparse frequency sampling of path attenuation, the
//! (depth, frequency) attenuation length table and cross-section tables.

use ndarray::Array2;

/// Segment index `i` and fraction `t` in [0, 1] such that `x` lies in
/// `[xs[i], xs[i + 1]]`. Values outside the axis clamp to the end segment.
///
/// `xs` must be strictly increasing with at least two entries.
pub fn locate(xs: &[f64], x: f64) -> (usize, f64) {
    let n = xs.len();
    if n < 2 {
        return (0, 0.0);
    }
    let i = xs.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2);
    let t = ((x - xs[i]) / (xs[i + 1] - xs[i])).clamp(0.0, 1.0);
    (i, t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Linear interpolation with constant extrapolation at both ends.
pub fn interp1d(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    match ys.len() {
        0 => 0.0,
        1 => ys[0],
        _ => {
            let (i, t) = locate(xs, x);
            lerp(ys[i], ys[i + 1], t)
        }
    }
}

/// Log-log interpolation with power-law extrapolation from the end segments.
///
/// All `xs` and `ys` must be strictly positive.
pub fn interp1d_loglog(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return ys[0];
    }
    let lx = x.ln();
    let i = xs.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2);
    let (x0, x1) = (xs[i].ln(), xs[i + 1].ln());
    let (y0, y1) = (ys[i].ln(), ys[i + 1].ln());
    let slope = (y1 - y0) / (x1 - x0);
    (y0 + slope * (lx - x0)).exp()
}

/// Bilinear interpolation of `field[[iy, ix]]` over axes `y_axis` (rows)
/// and `x_axis` (columns). Clamps to the table boundary.
pub fn interp2d(field: &Array2<f64>, y_axis: &[f64], x_axis: &[f64], y: f64, x: f64) -> f64 {
    let (ny, nx) = field.dim();
    if ny == 0 || nx == 0 {
        return 0.0;
    }
    let (iy0, ty) = if ny > 1 { locate(y_axis, y) } else { (0, 0.0) };
    let (ix0, tx) = if nx > 1 { locate(x_axis, x) } else { (0, 0.0) };
    let iy1 = (iy0 + 1).min(ny - 1);
    let ix1 = (ix0 + 1).min(nx - 1);

    let v00 = field[[iy0, ix0]];
    let v01 = field[[iy0, ix1]];
    let v10 = field[[iy1, ix0]];
    let v11 = field[[iy1, ix1]];

    lerp(lerp(v00, v01, tx), lerp(v10, v11, tx), ty)
}
