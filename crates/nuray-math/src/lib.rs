//! Numerical primitives for Nuray.
//!
//! Interpolation, real-signal FFT helpers, resampling, Gauss-Legendre
//! quadrature, bracketing root finders and a small 3-vector type.

pub mod fft;
pub mod interp;
pub mod poly;
pub mod quadrature;
pub mod resample;
pub mod roots;
pub mod vector;
