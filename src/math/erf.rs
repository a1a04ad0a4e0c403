//! Error-function lookup table and inverse.
//!
//! Gaussian distributions integrate through a tabulated erf; the truncated
//! Gaussian inverse-CDF sampler needs erf⁻¹.

use super::{mix, Float};
use std::sync::LazyLock;

const ERF_LUT_SIZE: usize = 2048;
const ERF_LUT_MAX: Float = 6.0;

static ERF_LUT: LazyLock<Vec<Float>> = LazyLock::new(|| {
    (0..ERF_LUT_SIZE)
        .map(|i| erf_series(i as Float / (ERF_LUT_SIZE - 1) as Float * ERF_LUT_MAX))
        .collect()
});

// Abramowitz & Stegun 7.1.26, max absolute error 1.5e-7; adequate for the
// table nodes which are then linearly interpolated.
fn erf_series(x: Float) -> Float {
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    1.0 - poly * (-x * x).exp()
}

/// erf(x), via table lookup with linear interpolation.
pub fn erf_lut(x: Float) -> Float {
    let ax = x.abs();
    if ax >= ERF_LUT_MAX {
        return if x < 0.0 { -1.0 } else { 1.0 };
    }
    let f = ax / ERF_LUT_MAX * (ERF_LUT_SIZE - 1) as Float;
    let i = f as usize;
    let v = if i + 1 < ERF_LUT_SIZE {
        mix(ERF_LUT[i], ERF_LUT[i + 1], f - i as Float)
    } else {
        ERF_LUT[i]
    };
    if x < 0.0 {
        -v
    } else {
        v
    }
}

/// erf⁻¹(x) for x ∈ (−1, 1). Giles' single-branch rational approximation
/// with one Newton refinement step.
pub fn erf_inv(x: Float) -> Float {
    if x <= -1.0 {
        return Float::NEG_INFINITY;
    }
    if x >= 1.0 {
        return Float::INFINITY;
    }

    let w = -((1.0 - x) * (1.0 + x)).ln();
    let mut p;
    if w < 5.0 {
        let w = w - 2.5;
        p = 2.81022636e-08;
        p = 3.43273939e-07 + p * w;
        p = -3.5233877e-06 + p * w;
        p = -4.39150654e-06 + p * w;
        p = 0.00021858087 + p * w;
        p = -0.00125372503 + p * w;
        p = -0.00417768164 + p * w;
        p = 0.246640727 + p * w;
        p = 1.50140941 + p * w;
    } else {
        let w = w.sqrt() - 3.0;
        p = -0.000200214257;
        p = 0.000100950558 + p * w;
        p = 0.00134934322 + p * w;
        p = -0.00367342844 + p * w;
        p = 0.00573950773 + p * w;
        p = -0.0076224613 + p * w;
        p = 0.00943887047 + p * w;
        p = 1.00167406 + p * w;
        p = 2.83297682 + p * w;
    }
    let mut r = p * x;

    // one Newton step against the series erf
    let e = erf_series(r.abs()) * r.signum() - x;
    r -= e / (2.0 / super::PI.sqrt() * (-r * r).exp());
    r
}
