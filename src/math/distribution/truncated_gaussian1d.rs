//! 1-D truncated Gaussian distribution.

use super::Sample1D;
use crate::math::{clamp, erf_inv, erf_lut, sqr, Float, Range, INV_SQRT_TWO, INV_SQRT_TWO_PI, SQRT_TWO};
use crate::sampler::{Measure, Sampler};

/// Gaussian truncated to a range, which may be half-infinite (single-sided
/// truncation). Correctly handles the singular case where the standard
/// deviation is 0 and the distribution becomes a Dirac.
#[derive(Copy, Clone, Debug)]
pub struct TruncatedGaussian1D {
    mu: Float,
    sigma: Float,
    recp_sigma: Float,

    alpha: Float,
    beta: Float,
    psi_a: Float,
    psi_b: Float,
    recp_z: Float,
}

#[inline]
fn phi(x: Float) -> Float {
    INV_SQRT_TWO_PI * (-0.5 * x * x).exp()
}

#[inline]
fn psi(x: Float) -> Float {
    if x == Float::NEG_INFINITY {
        return 0.0;
    }
    if x == 0.0 {
        return 0.5;
    }
    if x == Float::INFINITY {
        return 1.0;
    }
    0.5 * (1.0 + erf_lut(x * INV_SQRT_TWO))
}

#[inline]
fn inverse_psi(x: Float) -> Float {
    SQRT_TWO * erf_inv(2.0 * x - 1.0)
}

impl TruncatedGaussian1D {
    pub fn new(sigma: Float, mu: Float, range: &Range) -> Self {
        let recp_sigma = 1.0 / sigma;
        let s = if sigma > 0.0 { recp_sigma } else { 1.0 };
        let alpha = (range.min - mu) * s;
        let beta = (range.max - mu) * s;
        let psi_a = psi(alpha);
        let psi_b = psi(beta);
        Self {
            mu,
            sigma,
            recp_sigma,
            alpha,
            beta,
            psi_a,
            psi_b,
            recp_z: 1.0 / (psi_b - psi_a),
        }
    }

    /// The mean of the truncated distribution.
    pub fn mean(&self) -> Float {
        if self.is_dirac() {
            self.mu
        } else {
            self.mu + self.sigma * self.recp_z * (phi(self.alpha) - phi(self.beta))
        }
    }

    /// The standard deviation of the truncated distribution.
    pub fn std_dev(&self) -> Float {
        if self.is_dirac() {
            return 0.0;
        }

        let pa = phi(self.alpha);
        let pb = phi(self.beta);
        let r = pa - pb;
        let apa = if self.alpha.is_finite() {
            self.alpha * pa
        } else {
            0.0
        };
        let bpb = if self.beta.is_finite() {
            self.beta * pb
        } else {
            0.0
        };
        self.sigma
            * (1.0 - self.recp_z * (bpb - apa) - sqr(self.recp_z * r))
                .max(0.0)
                .sqrt()
    }

    /// Whether the distribution is degenerate (a Dirac delta).
    #[inline]
    pub fn is_dirac(&self) -> bool {
        self.sigma == 0.0
    }

    /// PDF of the distribution at `x`.
    pub fn pdf(&self, x: Float, measure: Measure) -> Float {
        let xi = (x - self.mu) * self.recp_sigma;
        if !self.is_dirac() {
            if measure == Measure::Continuous && (self.alpha..=self.beta).contains(&xi) {
                phi(xi) * self.recp_sigma * self.recp_z
            } else {
                0.0
            }
        } else if x == self.mu
            && self.alpha <= 0.0
            && self.beta >= 0.0
            && measure == Measure::Discrete
        {
            Float::INFINITY
        } else {
            0.0
        }
    }

    /// Samples a truncated-Gaussian distributed point by inverting Ψ.
    pub fn sample(&self, sampler: &mut dyn Sampler) -> Sample1D {
        if self.is_dirac() {
            return Sample1D {
                x: self.mu,
                measure: Measure::Discrete,
                pdf: 1.0,
            };
        }

        let r = sampler.r();
        let pt = self.sigma * inverse_psi(self.psi_a + r * (self.psi_b - self.psi_a)) + self.mu;
        Sample1D {
            x: pt,
            measure: Measure::Continuous,
            pdf: self.pdf(pt, Measure::Continuous),
        }
    }

    /// Integrates the distribution over a range.
    pub fn integrate(&self, r: &Range) -> Float {
        if self.is_dirac() {
            return if r.contains(self.mu) && self.alpha <= 0.0 && self.beta >= 0.0 {
                1.0
            } else {
                0.0
            };
        }

        let xi1 = clamp((r.min - self.mu) * self.recp_sigma, self.alpha, self.beta);
        let xi2 = clamp((r.max - self.mu) * self.recp_sigma, self.alpha, self.beta);
        (psi(xi2) - psi(xi1)) * self.recp_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::UniformSampler;

    #[test]
    fn samples_stay_in_range() {
        let r = Range::new(0.5, 2.0);
        let g = TruncatedGaussian1D::new(1.0, 0.0, &r);
        let mut s = UniformSampler::new(17);
        for _ in 0..10_000 {
            let smp = g.sample(&mut s);
            assert!(r.min - 1e-3 <= smp.x && smp.x <= r.max + 1e-3, "x={}", smp.x);
            assert!(smp.pdf > 0.0);
        }
    }

    #[test]
    fn normalised_over_truncation() {
        let r = Range::new(-0.5, 1.5);
        let g = TruncatedGaussian1D::new(0.7, 0.2, &r);
        assert!((g.integrate(&Range::all()) - 1.0).abs() < 1e-4);
        assert!((g.integrate(&r) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn single_sided_truncation() {
        let r = Range::new(0.0, Float::INFINITY);
        let g = TruncatedGaussian1D::new(1.0, 0.0, &r);
        // half-normal mean = σ sqrt(2/π)
        assert!((g.mean() - (2.0 / crate::math::PI).sqrt()).abs() < 1e-3);
        assert_eq!(g.pdf(-0.5, Measure::Continuous), 0.0);
    }

    #[test]
    fn dirac_in_range() {
        let g = TruncatedGaussian1D::new(0.0, 1.0, &Range::new(0.0, 2.0));
        assert!(g.is_dirac());
        assert_eq!(g.pdf(1.0, Measure::Discrete), Float::INFINITY);
        let out = TruncatedGaussian1D::new(0.0, 5.0, &Range::new(0.0, 2.0));
        assert_eq!(out.pdf(5.0, Measure::Discrete), 0.0);
    }

    #[test]
    fn unbiased_reciprocal_pdf() {
        let r = Range::new(-1.0, 1.0);
        let g = TruncatedGaussian1D::new(2.0, 0.0, &r);
        let mut s = UniformSampler::new(23);
        let n = 100_000;
        let mut acc = 0.0;
        for _ in 0..n {
            acc += 1.0 / g.sample(&mut s).pdf;
        }
        assert!((acc / n as Float - 2.0).abs() < 0.05);
    }
}
